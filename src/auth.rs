use fantoccini::key::Key;
use log::info;

use crate::client::Browser;
use crate::types::{Timing, TransferError};

pub const LOGIN_BUTTON: &str = ".login";
pub const USERNAME_INPUT: &str = "#login-username";
pub const PASSWORD_INPUT: &str = "#login-password";

/// Logs in through the site's login dialog.
///
/// Nothing checks that the login worked; a wrong password shows up later as
/// missing elements on pages that need a session.
pub async fn login<B: Browser>(
    browser: &mut B,
    site_url: &str,
    username: &str,
    password: &str,
    timing: &Timing,
) -> Result<(), TransferError> {
    info!("Logging in as {username}");

    browser.goto(site_url).await?;
    timing.settle().await;

    browser.click(LOGIN_BUTTON).await?;
    timing.settle().await;

    browser.send_keys(USERNAME_INPUT, username).await?;
    browser.send_keys(PASSWORD_INPUT, password).await?;
    browser
        .send_keys(PASSWORD_INPUT, &char::from(Key::Return).to_string())
        .await?;
    timing.settle().await;

    Ok(())
}
