//! Instruction message rendering for the OpenClaw agent.

use minijinja::{Environment, context};

use crate::fizzy::{Card, Creator, Notification};

const NOTIFICATION_TEMPLATE: &str = include_str!("templates/notification.md.jinja");

/// `fizzy` CLI commands the downstream agent is allowed to run.
pub const FIZZY_COMMANDS: &[&str] = &[
    "fizzy reaction list --card NUMBER",
    r#"fizzy reaction create --card NUMBER --content "emoji""#,
    "fizzy reaction delete REACTION_ID --card NUMBER",
    "fizzy reaction list --card NUMBER --comment COMMENT_ID",
    r#"fizzy reaction create --card NUMBER --comment COMMENT_ID --content "emoji""#,
    "fizzy reaction delete REACTION_ID --card NUMBER --comment COMMENT_ID",
    "fizzy comment list --card NUMBER [--page N] [--all]",
    "fizzy comment show COMMENT_ID --card NUMBER",
    r#"fizzy comment create --card NUMBER --body "HTML" [--body_file PATH] [--created-at TIMESTAMP]"#,
    r#"fizzy comment update COMMENT_ID --card NUMBER [--body "HTML"] [--body_file PATH]"#,
    "fizzy comment delete COMMENT_ID --card NUMBER",
    "fizzy card column CARD_NUMBER --column ID     # Move to column (use column ID or: maybe, not-yet, done)",
    "fizzy card move CARD_NUMBER --to BOARD_ID     # Move card to a different board",
    "fizzy card assign CARD_NUMBER --user ID       # Toggle user assignment",
    r#"fizzy card tag CARD_NUMBER --tag "name"       # Toggle tag (creates tag if needed)"#,
    "fizzy card watch CARD_NUMBER                  # Subscribe to notifications",
    "fizzy card unwatch CARD_NUMBER                # Unsubscribe",
    "fizzy card pin CARD_NUMBER                    # Pin card for quick access",
    "fizzy card unpin CARD_NUMBER                  # Unpin card",
    "fizzy card golden CARD_NUMBER                 # Mark as golden/starred",
    "fizzy card ungolden CARD_NUMBER               # Remove golden status",
    "fizzy card image-remove CARD_NUMBER           # Remove header image",
];

/// Render the instruction message for a human- or bot-authored notification.
///
/// Pure: the same notification always renders to the same bytes.
pub fn render_message(notification: &Notification, creator: &Creator) -> anyhow::Result<String> {
    let mut env = Environment::new();
    env.add_template("notification.md", NOTIFICATION_TEMPLATE)?;

    let card = notification.card.as_ref().map_or("", Card::number);
    let template = env.get_template("notification.md")?;
    let rendered = template.render(context! {
        creator_name => creator.name,
        creator_id => creator.id.as_str(),
        title => notification.title,
        body => notification.body,
        card => card,
        commands => FIZZY_COMMANDS,
    })?;

    Ok(rendered)
}
