//! Centralized keyboard shortcuts registry.
//!
//! Single source of truth for the shortcuts the TUI handles. The help dialog
//! is rendered from it.

use crossterm::event::KeyCode;

/// A keyboard shortcut definition
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// Primary key for this shortcut
    pub key: KeyCode,
    /// Alternative key (e.g., Enter as well as `s`)
    pub alt_key: Option<KeyCode>,
    /// Replaces the formatted keys in the help dialog (e.g. a key range)
    pub label: Option<&'static str>,
    /// Human-readable description of what this shortcut does
    pub description: &'static str,
    pub category: ShortcutCategory,
    /// Context where this shortcut is active
    pub context: ShortcutContext,
}

/// Categories for organizing shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutCategory {
    General,
    Workflow,
    Input,
}

/// Contexts where shortcuts are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutContext {
    /// Main workflow screen
    Global,
    /// Security verification dialog
    OtpDialog,
}

impl ShortcutCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutCategory::General => "General",
            ShortcutCategory::Workflow => "Workflow",
            ShortcutCategory::Input => "Input",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [ShortcutCategory] {
        &[
            ShortcutCategory::General,
            ShortcutCategory::Workflow,
            ShortcutCategory::Input,
        ]
    }
}

impl ShortcutContext {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutContext::Global => "Workflow",
            ShortcutContext::OtpDialog => "Security Verification",
        }
    }

    /// All contexts in display order
    pub fn all() -> &'static [ShortcutContext] {
        &[ShortcutContext::Global, ShortcutContext::OtpDialog]
    }
}

impl Shortcut {
    /// Format key for display (e.g., "q", "Tab", "s/Enter")
    pub fn key_display(&self) -> String {
        if let Some(label) = self.label {
            return label.to_string();
        }
        let primary = format_keycode(&self.key);
        match &self.alt_key {
            Some(alt) => format!("{}/{}", primary, format_keycode(alt)),
            None => primary,
        }
    }

    /// Format key for help dialog (left-padded to 10 chars)
    pub fn key_display_padded(&self) -> String {
        format!("{:<10}", self.key_display())
    }
}

fn format_keycode(key: &KeyCode) -> String {
    match key {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        _ => format!("{:?}", key),
    }
}

/// Static registry of all keyboard shortcuts
pub static SHORTCUTS: &[Shortcut] = &[
    // === Global Context ===
    Shortcut {
        key: KeyCode::Char('q'),
        alt_key: Some(KeyCode::Esc),
        label: None,
        description: "Quit",
        category: ShortcutCategory::General,
        context: ShortcutContext::Global,
    },
    Shortcut {
        key: KeyCode::Char('?'),
        alt_key: None,
        label: None,
        description: "Toggle help",
        category: ShortcutCategory::General,
        context: ShortcutContext::Global,
    },
    Shortcut {
        key: KeyCode::Char('s'),
        alt_key: Some(KeyCode::Enter),
        label: None,
        description: "Initiate workflow",
        category: ShortcutCategory::Workflow,
        context: ShortcutContext::Global,
    },
    Shortcut {
        key: KeyCode::Char('r'),
        alt_key: None,
        label: None,
        description: "Reset running workflow",
        category: ShortcutCategory::Workflow,
        context: ShortcutContext::Global,
    },
    Shortcut {
        key: KeyCode::Char('o'),
        alt_key: None,
        label: None,
        description: "Reopen security verification",
        category: ShortcutCategory::Workflow,
        context: ShortcutContext::Global,
    },
    // === OTP Dialog Context ===
    Shortcut {
        key: KeyCode::Char('0'),
        alt_key: None,
        label: Some("0-9"),
        description: "Enter a digit (paste also works)",
        category: ShortcutCategory::Input,
        context: ShortcutContext::OtpDialog,
    },
    Shortcut {
        key: KeyCode::Char('r'),
        alt_key: None,
        label: None,
        description: "Reset running workflow",
        category: ShortcutCategory::Workflow,
        context: ShortcutContext::OtpDialog,
    },
    Shortcut {
        key: KeyCode::Backspace,
        alt_key: None,
        label: None,
        description: "Delete last digit",
        category: ShortcutCategory::Input,
        context: ShortcutContext::OtpDialog,
    },
    Shortcut {
        key: KeyCode::Tab,
        alt_key: None,
        label: None,
        description: "Switch between Submit and Resend",
        category: ShortcutCategory::Input,
        context: ShortcutContext::OtpDialog,
    },
    Shortcut {
        key: KeyCode::Enter,
        alt_key: None,
        label: None,
        description: "Activate focused button",
        category: ShortcutCategory::Input,
        context: ShortcutContext::OtpDialog,
    },
    Shortcut {
        key: KeyCode::Esc,
        alt_key: None,
        label: None,
        description: "Close dialog",
        category: ShortcutCategory::General,
        context: ShortcutContext::OtpDialog,
    },
];

/// Get all shortcuts for a given context
pub fn shortcuts_for_context(context: ShortcutContext) -> impl Iterator<Item = &'static Shortcut> {
    SHORTCUTS.iter().filter(move |s| s.context == context)
}

/// Get shortcuts grouped by category for a given context
pub fn shortcuts_by_category_for_context(
    context: ShortcutContext,
) -> Vec<(ShortcutCategory, Vec<&'static Shortcut>)> {
    let mut result = Vec::new();
    for category in ShortcutCategory::all() {
        let shortcuts: Vec<&Shortcut> = shortcuts_for_context(context)
            .filter(|s| s.category == *category)
            .collect();
        if !shortcuts.is_empty() {
            result.push((*category, shortcuts));
        }
    }
    result
}
