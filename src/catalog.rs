//! Built-in catalog of well-known services and their categories.
//!
//! Used to auto-categorize new entries and to offer quick-add suggestions.

use crate::models::Category;

/// Known services. Each name appears once.
pub const SERVICES: &[(&str, Category)] = &[
    // Social media
    ("Instagram", Category::SocialMedia),
    ("Twitter", Category::SocialMedia),
    ("Facebook", Category::SocialMedia),
    ("LinkedIn", Category::SocialMedia),
    ("TikTok", Category::SocialMedia),
    ("Snapchat", Category::SocialMedia),
    ("Pinterest", Category::SocialMedia),
    ("Reddit", Category::SocialMedia),
    ("Discord", Category::SocialMedia),
    ("Telegram", Category::SocialMedia),
    // Streaming
    ("Netflix", Category::Streaming),
    ("Spotify", Category::Streaming),
    ("YouTube", Category::Streaming),
    ("Amazon Prime", Category::Streaming),
    ("Disney+", Category::Streaming),
    ("Apple Music", Category::Streaming),
    ("HBO Max", Category::Streaming),
    ("Hulu", Category::Streaming),
    ("Twitch", Category::Streaming),
    ("SoundCloud", Category::Streaming),
    // Email
    ("Gmail", Category::Email),
    ("Outlook", Category::Email),
    ("Yahoo Mail", Category::Email),
    ("ProtonMail", Category::Email),
    ("iCloud", Category::Email),
    ("Zoho Mail", Category::Email),
    ("FastMail", Category::Email),
    ("Tutanota", Category::Email),
    // Development
    ("GitHub", Category::Development),
    ("GitLab", Category::Development),
    ("Bitbucket", Category::Development),
    ("Stack Overflow", Category::Development),
    ("Docker Hub", Category::Development),
    ("npm", Category::Development),
    ("PyPI", Category::Development),
    ("Heroku", Category::Development),
    ("Vercel", Category::Development),
    ("Netlify", Category::Development),
    ("AWS", Category::Development),
    ("Azure", Category::Development),
    // Cloud storage
    ("Google Drive", Category::CloudStorage),
    ("Dropbox", Category::CloudStorage),
    ("OneDrive", Category::CloudStorage),
    ("Box", Category::CloudStorage),
    ("MEGA", Category::CloudStorage),
    ("pCloud", Category::CloudStorage),
    ("Backblaze", Category::CloudStorage),
    // Finance
    ("PayPal", Category::Finance),
    ("Stripe", Category::Finance),
    ("Venmo", Category::Finance),
    ("Cash App", Category::Finance),
    ("Robinhood", Category::Finance),
    ("Coinbase", Category::Finance),
    ("Bank of America", Category::Finance),
    ("Chase", Category::Finance),
    ("Wells Fargo", Category::Finance),
    // Shopping
    ("Amazon", Category::Shopping),
    ("eBay", Category::Shopping),
    ("Walmart", Category::Shopping),
    ("Target", Category::Shopping),
    ("Best Buy", Category::Shopping),
    ("Etsy", Category::Shopping),
    ("Shopify", Category::Shopping),
    ("AliExpress", Category::Shopping),
    ("Flipkart", Category::Shopping),
    // Work
    ("Slack", Category::Work),
    ("Microsoft Teams", Category::Work),
    ("Zoom", Category::Work),
    ("Notion", Category::Work),
    ("Trello", Category::Work),
    ("Jira", Category::Work),
    ("Asana", Category::Work),
    ("Monday.com", Category::Work),
    ("Figma", Category::Work),
    ("Canva", Category::Work),
];

/// Look up the category of a known service, ignoring case and
/// surrounding whitespace.
pub fn lookup(service: &str) -> Option<Category> {
    let service = service.trim();
    SERVICES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(service))
        .map(|(_, category)| *category)
}

/// Category for a new entry: the catalog's when known, otherwise `Other`.
pub fn categorize(service: &str) -> Category {
    lookup(service).unwrap_or(Category::Other)
}

/// Services in one category, in catalog order.
pub fn services_in(category: Category) -> impl Iterator<Item = &'static str> {
    SERVICES
        .iter()
        .filter(move |(_, c)| *c == category)
        .map(|(name, _)| *name)
}

/// Quick-add suggestions grouped by category, skipping empty groups.
pub fn suggestions() -> Vec<(Category, Vec<&'static str>)> {
    Category::ALL
        .iter()
        .map(|c| (*c, services_in(*c).collect::<Vec<_>>()))
        .filter(|(_, names)| !names.is_empty())
        .collect()
}
