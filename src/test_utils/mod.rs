#![allow(missing_docs)]

pub(crate) mod http;
pub(crate) mod state;

pub(crate) use http::{get_test_server, get_token, json_body};
pub(crate) use state::{
    TEST_PASSWORD, get_test_state, insert_test_user, insert_test_user_with_email,
};
