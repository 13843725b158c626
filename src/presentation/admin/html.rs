//! HTML fragments shown in the plugin row of the admin panel.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::domain::models::plugin::PLUGIN_ID;
use crate::presentation::admin::actions::{
    ACTION_CLOSE_DONATION, ACTION_CONVERT_PREVIOUS, PLUGINS_PAGE,
};

// RFC 3986 unreserved characters stay as they are.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const BUY_ME_A_COFFEE: &str = r#"<a href="https://www.buymeacoffee.com/tedem"><b>Buy me a coffee</b></a>"#;
const KO_FI: &str = r#"<a href="https://ko-fi.com/tedem"><b>KO-FI</b></a>"#;

pub fn description() -> String {
    concat!(
        r#"<div style="margin-top: 1em;">"#,
        "\n    It changes the extensions of the existing profile photos to <b>.webp</b> ",
        "and uploads the new profile photos as <b>.webp</b>.\n",
        "</div>"
    )
    .to_string()
}

/// Link to an admin action carrying the session post key
pub fn action_link(action: &str, post_code: &str) -> String {
    format!(
        "{}&{}={}&my_post_key={}",
        PLUGINS_PAGE,
        PLUGIN_ID,
        utf8_percent_encode(action, QUERY_VALUE),
        utf8_percent_encode(post_code, QUERY_VALUE)
    )
}

/// "Apply" link for the one-time conversion of previously uploaded avatars
pub fn apply_conversion_block(post_code: &str) -> String {
    let apply_button = format!(
        r#" &mdash; <a href="{}"><b>Apply</b></a>"#,
        action_link(ACTION_CONVERT_PREVIOUS, post_code)
    );
    let message = format!(
        "<b>Convert Extensions:</b> Change the extension of previously uploaded avatars to <b>.webp</b>{}",
        apply_button
    );
    let note = concat!(
        r#"<div><span style="color: darkgrey;">└</span> <b style="color: firebrick;">Note:</b> "#,
        "Before proceeding with this action, make sure to create backups of both the ",
        "<b>./uploads/avatars</b> folder and the database.</div>"
    );

    format!(r#"<div style="margin-top: 1em;">{}</div>{}"#, message, note)
}

pub fn donation_block(post_code: &str) -> String {
    let close_button = format!(
        r#" &mdash; <a href="{}"><b>Close Donation</b></a>"#,
        action_link(ACTION_CLOSE_DONATION, post_code)
    );
    let message = format!(
        "<b>Donation:</b> Support for new plugins, themes, etc. via {} or {}{}",
        BUY_ME_A_COFFEE, KO_FI, close_button
    );

    format!(r#"<div style="margin-top: 1em;">{}</div>"#, message)
}
