//! Display themes.
//!
//! A theme is a plain value chosen at startup (config or `--theme`) and handed
//! to whatever renders output.

use serde::{Deserialize, Serialize};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    #[must_use]
    pub fn hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Colors used by a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: Rgba,
    pub panel: Rgba,
    pub border: Rgba,
    pub text: Rgba,
    pub accent: Rgba,
}

const DARK: Palette = Palette {
    background: Rgba::opaque(0x37, 0x35, 0x3e),
    panel: Rgba::opaque(0x44, 0x44, 0x4e),
    border: Rgba::opaque(0x71, 0x5a, 0x5a),
    text: Rgba::opaque(0xff, 0xff, 0xff),
    accent: Rgba::opaque(0xd3, 0xda, 0xd9),
};

const LIGHT: Palette = Palette {
    background: Rgba::opaque(0xf0, 0xf0, 0xf0),
    panel: Rgba::opaque(0xff, 0xff, 0xff),
    border: Rgba::opaque(0xd3, 0xda, 0xd9),
    text: Rgba::opaque(0x1e, 0x1e, 0x1e),
    accent: Rgba::opaque(0x71, 0x5a, 0x5a),
};

/// Alpha applied to surfaces in the transparent variants.
const TRANSLUCENT: u8 = 0xc8;

/// Available themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    DarkTransparent,
    LightTransparent,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::DarkTransparent => "dark-transparent",
            Self::LightTransparent => "light-transparent",
        }
    }

    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark | Self::DarkTransparent)
    }

    #[must_use]
    pub fn palette(self) -> Palette {
        let base = if self.is_dark() { DARK } else { LIGHT };
        match self {
            Self::Dark | Self::Light => base,
            Self::DarkTransparent | Self::LightTransparent => Palette {
                background: base.background.with_alpha(TRANSLUCENT),
                panel: base.panel.with_alpha(TRANSLUCENT),
                ..base
            },
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            "dark-transparent" => Ok(Self::DarkTransparent),
            "light-transparent" => Ok(Self::LightTransparent),
            _ => Err(format!(
                "unknown theme: {s} (expected: dark, light, dark-transparent, light-transparent)"
            )),
        }
    }
}
