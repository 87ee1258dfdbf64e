//! Command palette parsing
//!
//! The `:` prompt accepts one command per line. Arguments are whitespace
//! separated; `create` additionally understands `link=` and `img=` tokens so
//! URLs with their own whitespace-free syntax stay out of the free-text
//! purpose.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Disconnect,
    Refresh,
    Mine,
    Create(Option<CreateArgs>),
    Contribute(Option<String>),
    Withdraw,
    WithdrawTo(String),
    Refund,
    Contribution,
    Pin(String),
    Export,
    Demo,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateArgs {
    pub goal_eth: String,
    pub duration_hours: u64,
    pub social_link: String,
    pub purpose: String,
    pub image_url: String,
}

pub fn parse_command(input: &str) -> Option<Command> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let mut parts = input.splitn(2, char::is_whitespace);
    let verb = parts.next()?.to_ascii_lowercase();
    let rest = parts.next().unwrap_or("").trim();

    let command = match verb.as_str() {
        "connect" => Command::Connect,
        "disconnect" => Command::Disconnect,
        "refresh" => Command::Refresh,
        "mine" => Command::Mine,
        "create" => Command::Create(parse_create_args(rest)),
        "contribute" => {
            if rest.is_empty() {
                Command::Contribute(None)
            } else {
                Command::Contribute(Some(rest.to_string()))
            }
        }
        "withdraw" => {
            if rest.is_empty() {
                Command::Withdraw
            } else {
                Command::WithdrawTo(rest.to_string())
            }
        }
        "refund" => Command::Refund,
        "contribution" => Command::Contribution,
        "pin" => {
            if rest.is_empty() {
                Command::Unknown("pin needs a file path".to_string())
            } else {
                Command::Pin(rest.to_string())
            }
        }
        "export" => Command::Export,
        "demo" => Command::Demo,
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}

/// `create <goal-eth> <duration-hours> [link=URL] [img=URL] <purpose...>`
pub fn parse_create_args(rest: &str) -> Option<CreateArgs> {
    let mut tokens = rest.split_whitespace();
    let goal_eth = tokens.next()?.to_string();
    let duration_hours: u64 = tokens.next()?.parse().ok()?;

    let mut social_link = String::new();
    let mut image_url = String::new();
    let mut purpose_words: Vec<&str> = Vec::new();
    for token in tokens {
        if let Some(url) = token.strip_prefix("link=") {
            social_link = url.to_string();
        } else if let Some(url) = token.strip_prefix("img=") {
            image_url = url.to_string();
        } else {
            purpose_words.push(token);
        }
    }
    if purpose_words.is_empty() {
        return None;
    }

    Some(CreateArgs {
        goal_eth,
        duration_hours,
        social_link,
        purpose: purpose_words.join(" "),
        image_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_verbs() {
        assert_eq!(parse_command("connect"), Some(Command::Connect));
        assert_eq!(parse_command("  refresh "), Some(Command::Refresh));
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn contribute_takes_optional_amount() {
        assert_eq!(
            parse_command("contribute 0.5"),
            Some(Command::Contribute(Some("0.5".to_string())))
        );
        assert_eq!(parse_command("contribute"), Some(Command::Contribute(None)));
    }

    #[test]
    fn withdraw_with_target_becomes_withdraw_to() {
        assert_eq!(parse_command("withdraw"), Some(Command::Withdraw));
        assert_eq!(
            parse_command("withdraw 0xdeadbeef00000000000000000000000000000000"),
            Some(Command::WithdrawTo(
                "0xdeadbeef00000000000000000000000000000000".to_string()
            ))
        );
    }

    #[test]
    fn create_args_pick_out_link_and_image() {
        let args =
            parse_create_args("2.5 720 link=https://x.com/me img=https://pic.io/a.png school laptops").unwrap();
        assert_eq!(args.goal_eth, "2.5");
        assert_eq!(args.duration_hours, 720);
        assert_eq!(args.social_link, "https://x.com/me");
        assert_eq!(args.image_url, "https://pic.io/a.png");
        assert_eq!(args.purpose, "school laptops");
    }

    #[test]
    fn create_needs_goal_duration_and_purpose() {
        assert!(parse_create_args("").is_none());
        assert!(parse_create_args("1.0").is_none());
        assert!(parse_create_args("1.0 24").is_none());
        assert!(parse_create_args("1.0 abc help").is_none());
    }

    #[test]
    fn unknown_verbs_are_preserved() {
        assert_eq!(
            parse_command("frobnicate"),
            Some(Command::Unknown("frobnicate".to_string()))
        );
    }
}
