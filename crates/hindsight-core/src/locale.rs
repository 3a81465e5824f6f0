/// Static notification texts per locale.
///
/// Stands in for the translation collaborator: lookup by primary language
/// subtag with an English fallback. Bodies are HTML fragments the bridge
/// renders as rich text.
pub struct Texts {
    pub greeting: &'static str,
    pub edited_title: &'static str,
    pub old_message_by: &'static str,
    pub new_message: &'static str,
    pub attachment_replaced: &'static str,
    pub deleted_title: &'static str,
    pub message_by: &'static str,
    pub by: &'static str,
    pub location_title: &'static str,
    pub location_note: &'static str,
    pub privacy_fallback: &'static str,
}

static EN: Texts = Texts {
    greeting: "<b>Connection active!</b>\n\nI'm now watching incoming messages and will \
               report if anyone edits or deletes them.",
    edited_title: "<b>\u{270f} Editing noticed!</b>",
    old_message_by: "Old message by",
    new_message: "New message:",
    attachment_replaced: "the attachment was replaced, old and new versions are attached",
    deleted_title: "<b>\u{1f5d1} Deletion noticed!</b>",
    message_by: "Message by",
    by: "by",
    location_title: "<b>\u{1f4cd} Location change detected!</b>",
    location_note: "P.S. The bot does not store location data and sees it only at the \
                    moment of update, so it is impossible to tell what exactly changed",
    privacy_fallback: "<b>The attachment can't be resent because of your privacy settings!</b>",
};

static RU: Texts = Texts {
    greeting: "<b>Подключение активно!</b>\n\nТеперь я слежу за входящими сообщениями и \
               сообщу, если кто-то отредактирует или удалит их.",
    edited_title: "<b>\u{270f} Замечено редактирование!</b>",
    old_message_by: "Старое сообщение от",
    new_message: "Новое сообщение:",
    attachment_replaced: "вложение было заменено, старая и новая версии приложены",
    deleted_title: "<b>\u{1f5d1} Замечено удаление!</b>",
    message_by: "Сообщение от",
    by: "от",
    location_title: "<b>\u{1f4cd} Замечено изменение геопозиции!</b>",
    location_note: "P.S. Бот не хранит данные о геопозиции и видит её только в момент \
                    обновления, поэтому узнать, что именно изменилось, невозможно",
    privacy_fallback: "<b>Вложение не удалось переслать из-за ваших настроек приватности!</b>",
};

pub fn texts(locale: &str) -> &'static Texts {
    match locale.split(['-', '_']).next() {
        Some("ru") => &RU,
        _ => &EN,
    }
}
