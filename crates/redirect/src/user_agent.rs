//! Coarse OS detection from a `User-Agent` header. Only the two mobile
//! families the app ships on matter; everything else is `Other`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Android,
    Ios,
    Other,
}

const IOS_DEVICES: [&str; 3] = ["iPhone", "iPad", "iPod"];

pub fn classify(user_agent: &str) -> OsFamily {
    // Windows Phone advertises "Android" for compatibility.
    if user_agent.contains("Windows Phone") {
        OsFamily::Other
    } else if user_agent.contains("Android") {
        OsFamily::Android
    } else if IOS_DEVICES.iter().any(|d| user_agent.contains(d)) {
        OsFamily::Ios
    } else {
        OsFamily::Other
    }
}
