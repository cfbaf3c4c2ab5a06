//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module      | Command     |
//! |-------------|-------------|
//! | `convert`   | `Convert`   |
//! | `flags`     | `Flags`     |
//! | `interpret` | `Interpret` |
//! | `check`     | `Check`     |
//! | `config`    | `Config`    |

pub mod check;
pub mod config;
pub mod convert;
pub mod flags;
pub mod interpret;

pub use check::cmd_check;
pub use config::cmd_config;
pub use convert::{ConvertArgs, cmd_convert};
pub use flags::cmd_flags;
pub use interpret::cmd_interpret;
