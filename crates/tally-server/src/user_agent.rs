use tally_core::{analytics::UserAgentClassifier, hit::AgentInfo};

/// Substrings that mark automated clients woothee does not categorise as
/// crawlers on its own.
const BOT_SIGNATURES: &[&str] = &[
    "bot",
    "spider",
    "crawler",
    "headlesschrome",
    "phantomjs",
    "python-requests",
    "curl/",
    "wget/",
    "go-http-client",
    "libwww-perl",
    "urllib",
    "httpclient",
];

fn has_bot_signature(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    BOT_SIGNATURES.iter().any(|sig| ua.contains(sig))
}

/// woothee's placeholder for fields it could not determine.
const UNKNOWN: &str = "UNKNOWN";

/// Unknown fields are stored as empty strings.
fn known(value: &str) -> String {
    if value == UNKNOWN {
        String::new()
    } else {
        value.to_string()
    }
}

/// User-agent classification via the `woothee` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct WootheeClassifier;

impl UserAgentClassifier for WootheeClassifier {
    fn classify(&self, user_agent: &str) -> AgentInfo {
        let signature = has_bot_signature(user_agent);
        match woothee::parser::Parser::new().parse(user_agent) {
            Some(result) => AgentInfo {
                is_bot: signature || result.category == "crawler",
                os: known(result.os),
                browser: known(result.name),
            },
            None => AgentInfo {
                is_bot: signature,
                os: String::new(),
                browser: String::new(),
            },
        }
    }
}
