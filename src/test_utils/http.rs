use axum_test::{TestResponse, TestServer};
use serde_json::Value;

use crate::{
    AppState, UserID,
    auth::encode_token,
    build_router,
};

pub(crate) fn get_test_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state)).expect("Could not create test server.")
}

#[track_caller]
pub(crate) fn get_token(state: &AppState, user_id: UserID) -> String {
    encode_token(user_id, &state.token_keys).expect("Could not create token.")
}

#[track_caller]
pub(crate) fn json_body(response: &TestResponse) -> Value {
    response.json::<Value>()
}
