//! User-facing reply texts.

pub const DENIED: &str = "Эта команда доступна только администратору.";
pub const STATUS_UPDATED: &str = "Ваш статус обновлён.";
pub const ASK_STATUS_TEXT: &str = "Напишите новый статус.";
pub const ASK_ITEM_NAME: &str = "Напишите название, которое нужно добавить.";
pub const ASK_ITEM_NUMBER: &str = "Отправьте номер позиции, которую нужно удалить:";
pub const NOTHING_TO_REMOVE: &str = "Список пуст, удалять нечего.";
pub const CATALOG_EMPTY: &str = "Список пока пуст.";
pub const CATALOG_HEADER: &str = "Список:";
pub const NOT_A_NUMBER: &str = "Пожалуйста, введите номер.";
pub const INVALID_NUMBER: &str = "Неверный номер.";
pub const CANCELLED: &str = "Действие отменено.";
pub const NO_CLIENTS: &str = "Пока никто не заходил.";
pub const SAVE_FAILED: &str = "Не удалось сохранить, попробуйте ещё раз.";

pub fn admin_welcome(name: &str) -> String {
    format!("Привет, {name}! Используй кнопки, чтобы обновить статус или список.")
}

pub fn user_welcome(name: &str) -> String {
    format!("Привет! Нажмите кнопку, чтобы узнать, где {name}, посмотреть список или связаться.")
}

pub fn admin_help() -> String {
    "Используй кнопки, чтобы обновить статус или список.".to_string()
}

pub fn user_help(name: &str) -> String {
    format!("Нажмите кнопку, чтобы узнать, где {name}, посмотреть список или связаться.")
}

pub fn present(name: &str) -> String {
    format!("{name} в общаге")
}

pub fn absent(name: &str) -> String {
    format!("{name} не в общаге")
}

pub fn contact(name: &str, link: &str) -> String {
    format!("Связаться с {name} можно по ссылке: {link}")
}

pub fn item_added(item: &str) -> String {
    format!("Добавлено: {item}")
}

pub fn item_removed(item: &str) -> String {
    format!("Удалено: {item}")
}

pub fn clients_header(count: usize) -> String {
    format!("Пользователей: {count}")
}
