//! 設定ファイルの読み込み
//!
//! パース → 解釈 → token 解決 → droplet の存在確認までをまとめて行います。

use crate::error::{FlowError, Result};
use crate::interpreter::{Interpretation, Interpreter};
use crate::model::Deployment;
use crate::resolver::resolve;
use crate::syntax::{SourceFile, parse_file, parse_source};
use std::path::Path;

/// 設定ファイルを読み込んでデプロイ設定を作る
pub fn load_configuration<P: AsRef<Path>>(path: P) -> Result<Deployment> {
    let file = parse_file(path)?;
    build_deployment(&file, &Interpreter::new())
}

/// 設定文字列からデプロイ設定を作る
pub fn load_configuration_from_str(source: &str, interpreter: &Interpreter) -> Result<Deployment> {
    let file = parse_source(source)?;
    build_deployment(&file, interpreter)
}

fn build_deployment(file: &SourceFile, interpreter: &Interpreter) -> Result<Deployment> {
    let Interpretation {
        variables,
        token,
        droplet,
    } = interpreter.interpret(file)?;

    let token = resolve(token.as_ref(), &variables)?;
    // 属性のない droplet ブロックは未定義として扱う
    let droplet = droplet
        .filter(|d| !d.attributes.is_empty())
        .ok_or(FlowError::MissingResource)?;

    tracing::debug!(
        "Loaded droplet '{}' with {} variables",
        droplet.resource_name,
        variables.len()
    );

    Ok(Deployment {
        token,
        droplet,
        variables,
    })
}
