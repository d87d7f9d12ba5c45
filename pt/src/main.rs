#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

//! pt is a command line application to send a test push notification.
//!
//! If the push test API key is "key",
//!
//! ```
//! $ export PUSH_TEST_API_KEY=key
//! $ pt --item-id 0000-0000
//! ```
//!
//! Optional fields are only sent when given,
//!
//! ```
//! $ pt --item-id 0000-0000 --title "New comment" --device-id device
//! ```
//!
//! For more information,
//!
//! ```
//! $ pt -h
//! ```

use anyhow::bail;

use clap::Parser;
use log::{debug, Level};
use logging_timer::{finish, stimer};

use pushtest::{TestPush, DEFAULT_BASE_URL};

const KEY_ENV_VAR: &str = "PUSH_TEST_API_KEY";

#[doc(hidden)]
#[derive(Debug, Parser)]
#[clap(about, author, version)]
struct Opts {
    /// Identifier of the item the test notification refers to
    #[clap(long)]
    item_id: String,
    /// Notification title
    #[clap(long)]
    title: Option<String>,
    /// Notification subtitle
    #[clap(long)]
    subtitle: Option<String>,
    /// Notification body text
    #[clap(long)]
    body: Option<String>,
    /// Send to a single registered device rather than all of the owner's devices
    #[clap(long)]
    device_id: Option<String>,
    /// Owner whose devices receive the test push
    #[clap(long)]
    owner_id: Option<String>,
    /// Origin of the push test endpoint
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

/// Reads an environment variable, trimmed. Unset, empty and
/// whitespace-only values are all treated as missing.
fn require_env(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("Missing required env var: {name}");
    }
    Ok(trimmed.to_string())
}

#[doc(hidden)]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    // Help goes to stdout with exit 0, any parse error to stderr with exit 1
    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let code = i32::from(e.use_stderr());
            e.print()?;
            std::process::exit(code);
        }
    };

    let key = require_env(KEY_ENV_VAR)?;

    let mut push = TestPush::new(&opts.item_id);
    push.title = opts.title.as_deref();
    push.subtitle = opts.subtitle.as_deref();
    push.body = opts.body.as_deref();
    push.device_id = opts.device_id.as_deref();
    push.owner_id = opts.owner_id.as_deref();
    push.base_url = Some(&opts.base_url);

    debug!("send test push to {}", push.endpoint());

    let tmr = stimer!(Level::Debug; "PUSH_TEST");
    let outcome = push.send(&key).await?;
    finish!(tmr);

    let rendered = serde_json::to_string_pretty(&outcome)?;
    if outcome.ok {
        println!("{rendered}");
    } else {
        eprintln!("{rendered}");
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;
    use clap::Parser;

    use crate::{require_env, Opts};

    #[test]
    fn test_parse_all_flags() {
        let parsed: Opts = Opts::try_parse_from(vec![
            "pt",
            "--item-id",
            "0000-0000",
            "--title",
            "title",
            "--subtitle",
            "subtitle",
            "--body",
            "body",
            "--device-id",
            "device",
            "--owner-id",
            "owner",
            "--base-url",
            "https://x.test",
        ])
        .unwrap();
        assert_eq!("0000-0000", parsed.item_id);
        assert_eq!(Some("title".to_string()), parsed.title);
        assert_eq!(Some("subtitle".to_string()), parsed.subtitle);
        assert_eq!(Some("body".to_string()), parsed.body);
        assert_eq!(Some("device".to_string()), parsed.device_id);
        assert_eq!(Some("owner".to_string()), parsed.owner_id);
        assert_eq!("https://x.test", parsed.base_url);
    }

    #[test]
    fn test_base_url_default() {
        let parsed: Opts = Opts::try_parse_from(vec!["pt", "--item-id", "0000-0000"]).unwrap();
        assert_eq!(pushtest::DEFAULT_BASE_URL, parsed.base_url);
        assert_eq!(None, parsed.title);
        assert_eq!(None, parsed.owner_id);
    }

    #[test]
    fn test_missing_item_id() {
        let err = Opts::try_parse_from(vec!["pt", "--title", "title"]).unwrap_err();
        assert_eq!(ErrorKind::MissingRequiredArgument, err.kind());
        assert!(err.use_stderr());
    }

    #[test]
    fn test_flag_value_starting_with_dashes() {
        // --body must not be consumed as the value of --title
        let result = Opts::try_parse_from(vec!["pt", "--item-id", "id", "--title", "--body"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unexpected_argument() {
        let result = Opts::try_parse_from(vec!["pt", "--item-id", "id", "stray"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_exits_clean() {
        let err = Opts::try_parse_from(vec!["pt", "--help"]).unwrap_err();
        assert_eq!(ErrorKind::DisplayHelp, err.kind());
        assert!(!err.use_stderr());

        // help wins even with other flags present
        let err = Opts::try_parse_from(vec!["pt", "--item-id", "id", "-h"]).unwrap_err();
        assert_eq!(ErrorKind::DisplayHelp, err.kind());
        assert!(!err.use_stderr());
    }

    #[test]
    fn test_require_env_missing() {
        std::env::remove_var("PT_TEST_MISSING");
        let err = require_env("PT_TEST_MISSING").unwrap_err();
        assert_eq!("Missing required env var: PT_TEST_MISSING", err.to_string());
    }

    #[test]
    fn test_require_env_whitespace_only() {
        std::env::set_var("PT_TEST_BLANK", "  \t ");
        let err = require_env("PT_TEST_BLANK").unwrap_err();
        assert_eq!("Missing required env var: PT_TEST_BLANK", err.to_string());
    }

    #[test]
    fn test_require_env_trims() {
        std::env::set_var("PT_TEST_PADDED", " key \n");
        assert_eq!("key", require_env("PT_TEST_PADDED").unwrap());
    }
}
