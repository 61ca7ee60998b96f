use crate::messaging::types::ReplyKeyboard;

pub const BTN_PRESENT: &str = "Я в общаге";
pub const BTN_ABSENT: &str = "Меня нет в общаге";
pub const BTN_CHANGE_STATUS: &str = "Изменить статус";
pub const BTN_ADD_ITEM: &str = "Добавить";
pub const BTN_REMOVE_ITEM: &str = "Удалить";
pub const BTN_VIEW_CATALOG: &str = "Список";
pub const BTN_QUERY_STATUS: &str = "Узнать статус";
pub const BTN_CONTACT: &str = "Связаться";

/// Action bound to a menu button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    SetPresent,
    SetAbsent,
    ChangeStatus,
    AddItem,
    RemoveItem,
    ViewCatalog,
    QueryStatus,
    Contact,
}

const VOCABULARY: &[(&str, MenuAction)] = &[
    (BTN_PRESENT, MenuAction::SetPresent),
    (BTN_ABSENT, MenuAction::SetAbsent),
    (BTN_CHANGE_STATUS, MenuAction::ChangeStatus),
    (BTN_ADD_ITEM, MenuAction::AddItem),
    (BTN_REMOVE_ITEM, MenuAction::RemoveItem),
    (BTN_VIEW_CATALOG, MenuAction::ViewCatalog),
    (BTN_QUERY_STATUS, MenuAction::QueryStatus),
    (BTN_CONTACT, MenuAction::Contact),
];

impl MenuAction {
    /// Exact, case-sensitive lookup. Anything else is not a menu phrase.
    pub fn from_text(text: &str) -> Option<Self> {
        VOCABULARY
            .iter()
            .find(|(label, _)| *label == text)
            .map(|(_, action)| *action)
    }

    /// Whether only the admin may run this action.
    pub fn is_privileged(self) -> bool {
        matches!(
            self,
            Self::SetPresent | Self::SetAbsent | Self::ChangeStatus | Self::AddItem | Self::RemoveItem
        )
    }
}

pub fn admin_keyboard() -> ReplyKeyboard {
    ReplyKeyboard::new(&[
        &[BTN_PRESENT, BTN_ABSENT],
        &[BTN_CHANGE_STATUS],
        &[BTN_ADD_ITEM, BTN_REMOVE_ITEM],
        &[BTN_VIEW_CATALOG],
    ])
}

pub fn user_keyboard() -> ReplyKeyboard {
    ReplyKeyboard::new(&[&[BTN_QUERY_STATUS], &[BTN_VIEW_CATALOG], &[BTN_CONTACT]])
}

pub fn keyboard_for(is_admin: bool) -> ReplyKeyboard {
    if is_admin {
        admin_keyboard()
    } else {
        user_keyboard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_exact_labels() {
        assert_eq!(MenuAction::from_text("Добавить"), Some(MenuAction::AddItem));
        assert_eq!(MenuAction::from_text("Связаться"), Some(MenuAction::Contact));
        assert_eq!(
            MenuAction::from_text("Меня нет в общаге"),
            Some(MenuAction::SetAbsent)
        );
    }

    #[test]
    fn near_misses_fall_through() {
        assert_eq!(MenuAction::from_text("добавить"), None);
        assert_eq!(MenuAction::from_text(" Добавить"), None);
        assert_eq!(MenuAction::from_text("Добавить "), None);
        assert_eq!(MenuAction::from_text("Удалит"), None);
        assert_eq!(MenuAction::from_text(""), None);
    }

    #[test]
    fn every_keyboard_button_resolves() {
        for kb in [admin_keyboard(), user_keyboard()] {
            for label in kb.rows.iter().flatten() {
                assert!(MenuAction::from_text(label).is_some(), "{label}");
            }
        }
    }

    #[test]
    fn user_keyboard_has_no_privileged_buttons() {
        for label in user_keyboard().rows.iter().flatten() {
            let action = MenuAction::from_text(label).unwrap();
            assert!(!action.is_privileged(), "{label}");
        }
        assert!(admin_keyboard().contains(BTN_REMOVE_ITEM));
    }
}
