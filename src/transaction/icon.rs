//! Maps category labels to the glyph shown next to a transaction.

/// The icon used for categories that are not in the catalogue.
pub const DEFAULT_ICON: &str = "💰";

/// The categories offered by the income and expense forms and their icons.
const CATEGORY_ICONS: &[(&str, &str)] = &[
    // Expenses
    ("Food & Dining", "🍽️"),
    ("Transportation", "🚗"),
    ("Shopping", "🛍️"),
    ("Entertainment", "🎬"),
    ("Healthcare", "🏥"),
    ("Rent", "🏠"),
    ("Utilities", "⚡"),
    ("Internet", "🌐"),
    ("Phone Bill", "📱"),
    ("Insurance", "🔒"),
    ("Subscriptions", "📺"),
    ("Other", "📌"),
    // Income
    ("Salary", "💰"),
    ("Freelance", "💻"),
    ("Investments", "📈"),
    ("Business", "🏢"),
    ("Rental", "🏠"),
    ("Side Hustle", "🎯"),
    ("Gifts", "🎁"),
];

/// Get the icon for `category`, ignoring case and surrounding whitespace.
///
/// Unknown categories get [DEFAULT_ICON].
pub fn icon_for_category(category: &str) -> &'static str {
    let category = category.trim();

    CATEGORY_ICONS
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(category))
        .map_or(DEFAULT_ICON, |&(_, icon)| icon)
}
