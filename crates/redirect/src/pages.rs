//! HTML served to phone visitors.

pub const ANDROID_EVENT: &str = "redirected_to_android_playstore";
pub const IOS_EVENT: &str = "redirected_to_iOS_appstore";

pub const OTHER_BROWSER_TEXT: &str =
    "Run this on an Android or iOS phone and see the magic happen :). Be.Well By Slade360";

/// Page that records `event` and immediately forwards to `store_link`.
pub fn store_page(event: &str, store_link: &str) -> String {
    format!(
        r#"<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta http-equiv="refresh" content="3; url={store_link}">
    <title>Be.Well By Slade360</title>
</head>
<body data-event="{event}">
    <script>
        window.dataLayer = window.dataLayer || [];
        window.dataLayer.push({{ event: "{event}" }});
        window.location.replace("{store_link}");
    </script>
    <noscript><a href="{store_link}">Get Be.Well</a></noscript>
</body>
</html>
"#
    )
}
