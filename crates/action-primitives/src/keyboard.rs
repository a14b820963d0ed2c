//! Fixed US-QWERTY layout used to synthesize typed text.

use crate::errors::{ActionResult, ActionResultCode};
use crate::ports::{KeyEvent, KeyEventKind, KeyMod};

/// (unshifted char, shifted char, DOM code, virtual key code)
const LAYOUT: &[(char, char, &str, u16)] = &[
    ('a', 'A', "KeyA", 0x41),
    ('b', 'B', "KeyB", 0x42),
    ('c', 'C', "KeyC", 0x43),
    ('d', 'D', "KeyD", 0x44),
    ('e', 'E', "KeyE", 0x45),
    ('f', 'F', "KeyF", 0x46),
    ('g', 'G', "KeyG", 0x47),
    ('h', 'H', "KeyH", 0x48),
    ('i', 'I', "KeyI", 0x49),
    ('j', 'J', "KeyJ", 0x4A),
    ('k', 'K', "KeyK", 0x4B),
    ('l', 'L', "KeyL", 0x4C),
    ('m', 'M', "KeyM", 0x4D),
    ('n', 'N', "KeyN", 0x4E),
    ('o', 'O', "KeyO", 0x4F),
    ('p', 'P', "KeyP", 0x50),
    ('q', 'Q', "KeyQ", 0x51),
    ('r', 'R', "KeyR", 0x52),
    ('s', 'S', "KeyS", 0x53),
    ('t', 'T', "KeyT", 0x54),
    ('u', 'U', "KeyU", 0x55),
    ('v', 'V', "KeyV", 0x56),
    ('w', 'W', "KeyW", 0x57),
    ('x', 'X', "KeyX", 0x58),
    ('y', 'Y', "KeyY", 0x59),
    ('z', 'Z', "KeyZ", 0x5A),
    ('0', ')', "Digit0", 0x30),
    ('1', '!', "Digit1", 0x31),
    ('2', '@', "Digit2", 0x32),
    ('3', '#', "Digit3", 0x33),
    ('4', '$', "Digit4", 0x34),
    ('5', '%', "Digit5", 0x35),
    ('6', '^', "Digit6", 0x36),
    ('7', '&', "Digit7", 0x37),
    ('8', '*', "Digit8", 0x38),
    ('9', '(', "Digit9", 0x39),
    ('`', '~', "Backquote", 0xC0),
    ('-', '_', "Minus", 0xBD),
    ('=', '+', "Equal", 0xBB),
    ('[', '{', "BracketLeft", 0xDB),
    (']', '}', "BracketRight", 0xDD),
    ('\\', '|', "Backslash", 0xDC),
    (';', ':', "Semicolon", 0xBA),
    ('\'', '"', "Quote", 0xDE),
    (',', '<', "Comma", 0xBC),
    ('.', '>', "Period", 0xBE),
    ('/', '?', "Slash", 0xBF),
];

const VKEY_SPACE: u16 = 0x20;
const VKEY_RETURN: u16 = 0x0D;

/// One physical key press producing a single character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: String,
    pub code: &'static str,
    pub key_code: u16,
    pub text: char,
    pub unmodified_text: char,
    pub shift: bool,
}

impl KeyStroke {
    pub fn enter() -> Self {
        Self {
            key: "Enter".to_string(),
            code: "Enter",
            key_code: VKEY_RETURN,
            text: '\r',
            unmodified_text: '\r',
            shift: false,
        }
    }

    pub fn for_char(ch: char) -> Option<Self> {
        match ch {
            ' ' => Some(Self {
                key: " ".to_string(),
                code: "Space",
                key_code: VKEY_SPACE,
                text: ' ',
                unmodified_text: ' ',
                shift: false,
            }),
            '\n' => Some(Self::enter()),
            _ => LAYOUT
                .iter()
                .find(|(plain, shifted, _, _)| *plain == ch || *shifted == ch)
                .map(|&(plain, _, code, key_code)| Self {
                    key: ch.to_string(),
                    code,
                    key_code,
                    text: ch,
                    unmodified_text: plain,
                    shift: ch != plain,
                }),
        }
    }

    /// Key-down, char, key-up triple for this stroke.
    pub fn events(&self) -> [KeyEvent; 3] {
        let modifiers = if self.shift {
            KeyMod::SHIFT
        } else {
            KeyMod::empty()
        };
        let event = |kind, text: Option<char>, unmodified: Option<char>| KeyEvent {
            kind,
            key: self.key.clone(),
            code: self.code,
            key_code: self.key_code,
            text,
            unmodified_text: unmodified,
            modifiers,
        };
        [
            event(KeyEventKind::RawKeyDown, None, None),
            event(
                KeyEventKind::Char,
                Some(self.text),
                Some(self.unmodified_text),
            ),
            event(KeyEventKind::KeyUp, None, None),
        ]
    }
}

/// Maps `text` to key strokes, appending Enter when requested.
pub fn strokes_for_text(
    text: &str,
    follow_by_enter: bool,
) -> Result<Vec<KeyStroke>, ActionResult> {
    if let Some(bad) = text.chars().find(|ch| !ch.is_ascii()) {
        return Err(ActionResult::new(
            ActionResultCode::TypeUnsupportedCharacters,
            format!("non-ASCII character {:?}", bad),
        ));
    }

    let mut strokes = Vec::with_capacity(text.len() + usize::from(follow_by_enter));
    for ch in text.chars() {
        let stroke = KeyStroke::for_char(ch).ok_or_else(|| {
            ActionResult::new(
                ActionResultCode::TypeFailedMappingCharToKey,
                format!("no key for {:?}", ch),
            )
        })?;
        strokes.push(stroke);
    }
    if follow_by_enter {
        strokes.push(KeyStroke::enter());
    }
    Ok(strokes)
}
