//! logos ベースの字句解析

use crate::error::{FlowError, Result};
use logos::{FilterResult, Logos};
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"//[^\n]*")]
pub(crate) enum TokenKind {
    /// `/* ... */` は読み飛ばすので出力されない
    #[token("/*", block_comment)]
    BlockComment,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("=")]
    Eq,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r"[A-Za-z_][A-Za-z0-9_-]*")]
    Ident,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Eq => "'='",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::String => "文字列",
            TokenKind::Number => "数値",
            TokenKind::Ident => "識別子",
            TokenKind::BlockComment => "コメント",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub span: Range<usize>,
}

/// ソース全体をトークン列に変換
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                text: lexer.slice(),
                span,
            }),
            Err(()) if lexer.slice().starts_with("/*") => {
                return Err(error_at(source, span.start, "コメントが閉じられていません"));
            }
            Err(()) => {
                return Err(error_at(
                    source,
                    span.start,
                    format!("不正な文字列です: {:?}", lexer.slice()),
                ));
            }
        }
    }

    Ok(tokens)
}

/// `/*` から対応する `*/` までを読み飛ばす（閉じていなければエラー）
fn block_comment(lex: &mut logos::Lexer<TokenKind>) -> FilterResult<(), ()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(())
        }
    }
}

/// バイトオフセットから1始まりの行・列を求めてエラーを作る
pub(crate) fn error_at(source: &str, offset: usize, message: impl Into<String>) -> FlowError {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map(|nl| before[nl + 1..].chars().count())
        .unwrap_or_else(|| before.chars().count())
        + 1;

    FlowError::Parse {
        line,
        column,
        message: message.into(),
    }
}
