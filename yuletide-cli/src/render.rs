use yuletide_core::{GameConfig, Notice, StockCap, UserId};
use yuletide_lottery::{ClaimReply, LotteryOutcome};

pub const GIFT_EMOJI: &str = "🎁";
pub const TREE_EMOJI: &str = "🎄";
pub const SNOWFLAKE_EMOJI: &str = "❄️";
pub const STAR_EMOJI: &str = "⭐";
pub const BOOK_EMOJI: &str = "📚";

pub fn mention(user: UserId) -> String {
    format!("<@{}>", user)
}

pub fn percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

pub fn cap(cap: StockCap) -> String {
    match cap {
        StockCap::Unlimited => "unlimited".to_string(),
        StockCap::Limited(n) => n.to_string(),
    }
}

pub fn notice(notice: &Notice) -> String {
    match notice {
        Notice::Gift {
            gift_id,
            lifetime_secs,
        } => format!(
            "{gift} A wild gift appears! {gift}\n{tree} Be quick! Claim it to try your luck! \
             (disappears in {secs} seconds, gift {id})",
            gift = GIFT_EMOJI,
            tree = TREE_EMOJI,
            secs = lifetime_secs,
            id = gift_id
        ),
        Notice::WinRecord { user, reward } => {
            format!("[log] {} won the {}", mention(*user), reward)
        }
    }
}

pub fn reply(reply: &ClaimReply, config: &GameConfig) -> String {
    match reply {
        ClaimReply::TooLate { claimed_by } => format!(
            "Too late! {} already grabbed this gift!",
            mention(*claimed_by)
        ),
        ClaimReply::Gone => "This gift is gone. Wait for the next one!".to_string(),
        ClaimReply::Resolved { gift, outcome } => lottery(gift.claimed_by, outcome, config),
    }
}

pub fn lottery(user: UserId, outcome: &LotteryOutcome, config: &GameConfig) -> String {
    let who = mention(user);
    match outcome {
        LotteryOutcome::BookWin => format!(
            "{star} INCREDIBLE! {star}\n{book} {who} won the book '{title}'! {book}\n\
             Congratulations on this exceptional luck! 🎉",
            star = STAR_EMOJI,
            book = BOOK_EMOJI,
            who = who,
            title = config.book_title
        ),
        LotteryOutcome::RoleWin => format!(
            "{star} CONGRATULATIONS! {star}\n🎊 {who} won the role {role}! 🎊\n\
             Welcome to Santa's team of elves! 🎅",
            star = STAR_EMOJI,
            who = who,
            role = config.role_name
        ),
        LotteryOutcome::RoleGrantFailed { reason } => format!(
            "{} won the role {}, but I am not allowed to grant it ({}). \
             An administrator needs to check the role hierarchy.",
            who, config.role_name, reason
        ),
        LotteryOutcome::RoleGrantError { .. } => format!(
            "{} won the role {}, but granting it failed. An administrator will sort it out.",
            who, config.role_name
        ),
        LotteryOutcome::Failed { .. } => format!(
            "{}, something went wrong while opening your gift. Please try again on the next one.",
            who
        ),
        LotteryOutcome::AlreadyWonEverything => format!(
            "{} Already a winner!\n{}, you already have the role {} and the book. \
             Let the others play! {}",
            SNOWFLAKE_EMOJI, who, config.role_name, TREE_EMOJI
        ),
        LotteryOutcome::NoWin { fact } => format!(
            "{} No luck this time!\n{}, no prize... but here is a Christmas fun fact! {}\n\n{}",
            SNOWFLAKE_EMOJI, who, TREE_EMOJI, fact
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use yuletide_core::ChannelId;
    use yuletide_lottery::ClaimedGift;

    #[test]
    fn test_too_late_names_winner() {
        let text = reply(
            &ClaimReply::TooLate {
                claimed_by: UserId(12),
            },
            &GameConfig::default(),
        );
        assert!(text.contains("<@12>"));
        assert!(text.starts_with("Too late"));
    }

    #[test]
    fn test_book_win_mentions_title() {
        let config = GameConfig::default();
        let gift = ClaimedGift {
            gift_id: Uuid::new_v4(),
            channel: ChannelId(1),
            claimed_by: UserId(5),
            claimed_at: Utc::now(),
        };
        let text = reply(
            &ClaimReply::Resolved {
                gift,
                outcome: LotteryOutcome::BookWin,
            },
            &config,
        );
        assert!(text.contains(&config.book_title));
        assert!(text.contains("<@5>"));
    }

    #[test]
    fn test_consolation_carries_fact() {
        let text = lottery(
            UserId(1),
            &LotteryOutcome::NoWin {
                fact: "Reindeer like snow.".to_string(),
            },
            &GameConfig::default(),
        );
        assert!(text.ends_with("Reindeer like snow."));
    }

    #[test]
    fn test_grant_errors_name_the_role() {
        let config = GameConfig::default();
        let denied = lottery(
            UserId(2),
            &LotteryOutcome::RoleGrantFailed {
                reason: "hierarchy".to_string(),
            },
            &config,
        );
        assert!(denied.contains("not allowed"));

        let failed = lottery(
            UserId(2),
            &LotteryOutcome::RoleGrantError {
                reason: "timeout".to_string(),
            },
            &config,
        );
        assert!(failed.contains(&config.role_name));
        assert!(failed.contains("granting it failed"));
    }

    #[test]
    fn test_caps_and_odds() {
        assert_eq!(cap(StockCap::Unlimited), "unlimited");
        assert_eq!(cap(StockCap::Limited(3)), "3");
        assert_eq!(percent(0.25), "25.0%");
    }
}
