//! provider token の変数解決

use crate::error::{FlowError, Result};
use crate::model::{TokenExpr, Variables};

/// token 式を変数表で解決する
///
/// - 未設定 → [`FlowError::MissingToken`]
/// - `var.<name>` → 変数の値（未定義なら [`FlowError::UndefinedVariable`]）
/// - それ以外 → リテラルをそのまま返す
pub fn resolve(token: Option<&TokenExpr>, variables: &Variables) -> Result<String> {
    match token {
        None => Err(FlowError::MissingToken),
        Some(TokenExpr::VariableRef(name)) => variables
            .get(name)
            .map(str::to_string)
            .ok_or_else(|| FlowError::UndefinedVariable(name.clone())),
        Some(TokenExpr::Literal(value)) => Ok(value.clone()),
    }
}
