//! Shared UI icons and emojis.

use console::Emoji;

pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", ">");
pub static MUSIC: Emoji<'_, '_> = Emoji("🎤 ", "*");
pub static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
