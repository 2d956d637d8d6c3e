use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Success,
    Destructive,
}

/// One-shot message shown to the user after a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub variant: NotificationVariant,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn submitted(name: &str) -> Self {
        Self {
            variant: NotificationVariant::Success,
            title: "Заявка отправлена!".into(),
            description: format!("{}, мы свяжемся с вами в ближайшее время", name.trim()),
        }
    }

    pub fn missing_fields() -> Self {
        Self {
            variant: NotificationVariant::Destructive,
            title: "Ошибка".into(),
            description: "Пожалуйста, заполните все обязательные поля".into(),
        }
    }

    pub fn failed(contact_phone: &str) -> Self {
        Self {
            variant: NotificationVariant::Destructive,
            title: "Ошибка".into(),
            description: format!("Не удалось отправить заявку. Позвоните нам: {contact_phone}"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.variant == NotificationVariant::Success
    }
}
