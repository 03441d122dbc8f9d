//! Tinyform Core
//!
//! HCLサブセットで書かれた設定ファイル（provider / variable / resource を各1つ）を
//! パースし、変数を解決した droplet 設定に変換します。
//!
//! ```text
//! main.tf ──▶ syntax (lexer/parser) ──▶ interpreter ──▶ resolver ──▶ Deployment
//! ```

pub mod error;
pub mod interpreter;
pub mod loader;
pub mod model;
pub mod resolver;
pub mod syntax;

pub use error::{FlowError, Result};
pub use interpreter::{Interpretation, Interpreter, expand_home, expand_home_with};
pub use loader::{load_configuration, load_configuration_from_str};
pub use model::{
    AttrValue, Deployment, DropletConfig, PROVIDER_DIGITALOCEAN, RESOURCE_DROPLET, TokenExpr,
    Variables,
};
pub use resolver::resolve;
pub use syntax::{Block, Body, Expr, KeyValue, SourceFile, parse_file, parse_source};
