use hindsight_types::content::ChatRef;

use crate::locale::Texts;

fn sender(chat: &ChatRef) -> String {
    match &chat.link {
        Some(link) => format!("<b><a href='{link}'>{}</a></b>", chat.display_name),
        None => format!("<b>{}</b>", chat.display_name),
    }
}

fn quote(body: &str) -> String {
    format!("<blockquote expandable>{body}</blockquote>")
}

/// Old-vs-new diff for an edited text body or caption.
pub fn edited(texts: &Texts, chat: &ChatRef, old: &str, new: &str) -> String {
    format!(
        "{}\n\n{} {}:{}\n{}{}",
        texts.edited_title,
        texts.old_message_by,
        sender(chat),
        quote(old),
        texts.new_message,
        quote(new),
    )
}

/// Edit notice for subtypes whose captions are not diffed; accompanies the
/// old/new attachment comparison group.
pub fn edited_attachment(texts: &Texts, chat: &ChatRef) -> String {
    format!(
        "{}\n\n{} {}: {}",
        texts.edited_title,
        texts.message_by,
        sender(chat),
        texts.attachment_replaced,
    )
}

/// Deletion notice, optionally quoting the recovered text or caption.
pub fn deleted(texts: &Texts, chat: &ChatRef, quoted: Option<&str>) -> String {
    let mut text = format!("{}\n\n{} {}:", texts.deleted_title, texts.message_by, sender(chat));
    if let Some(body) = quoted {
        text.push_str(&quote(body));
    }
    text
}

pub fn location_changed(texts: &Texts, chat: &ChatRef) -> String {
    format!(
        "{}\n\n{} {}\n\n{}",
        texts.location_title,
        texts.by,
        sender(chat),
        texts.location_note,
    )
}
