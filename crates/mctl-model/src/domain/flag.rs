use serde::{Deserialize, Serialize};

/// On/off switch taken from a command-line flag. Off unless given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub struct Flag {
    on: bool,
}

impl Flag {
    /// Switch turned on.
    pub const fn enabled() -> Self {
        Self { on: true }
    }

    /// Switch turned off.
    pub const fn disabled() -> Self {
        Self { on: false }
    }

    pub const fn is_enabled(&self) -> bool {
        self.on
    }

    pub const fn is_disabled(&self) -> bool {
        !self.is_enabled()
    }
}

impl From<bool> for Flag {
    fn from(on: bool) -> Self {
        Self { on }
    }
}

impl From<Flag> for bool {
    fn from(flag: Flag) -> Self {
        flag.on
    }
}

#[cfg(test)]
mod tests {
    use super::Flag;

    #[test]
    fn absent_flag_is_off() {
        assert_eq!(Flag::default(), Flag::disabled());
        assert!(!Flag::default().is_enabled());
    }

    #[test]
    fn converts_both_ways() {
        assert!(Flag::from(true).is_enabled());
        assert!(Flag::from(false).is_disabled());
        assert!(!bool::from(Flag::disabled()));
    }

    #[test]
    fn json_is_a_bare_bool() {
        assert_eq!(serde_json::to_string(&Flag::enabled()).unwrap(), "true");
        let off: Flag = serde_json::from_str("false").unwrap();
        assert!(off.is_disabled());
    }
}
