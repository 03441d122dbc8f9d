//! 再帰下降パーサー

use super::lexer::{Token, TokenKind, error_at, tokenize};
use super::{Block, Body, Expr, KeyValue, SourceFile};
use crate::error::{FlowError, Result};
use std::fs;
use std::path::Path;

/// 設定ファイルを読み込んでパース
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<SourceFile> {
    let content = fs::read_to_string(path.as_ref())?;
    tracing::debug!("Parsing {}", path.as_ref().display());
    parse_source(&content)
}

/// ソース文字列をパース
pub fn parse_source(source: &str) -> Result<SourceFile> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };

    let mut blocks = Vec::new();
    while !parser.at_end() {
        blocks.push(parser.block()?);
    }

    Ok(SourceFile { blocks })
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token<'src>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> FlowError {
        let offset = self
            .peek()
            .map(|t| t.span.start)
            .unwrap_or(self.source.len());
        error_at(self.source, offset, message)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                let token = token.clone();
                self.pos += 1;
                Ok(token)
            }
            Some(token) => Err(self.error(format!(
                "{} が必要ですが '{}' が見つかりました",
                kind, token.text
            ))),
            None => Err(self.error(format!("{} が必要ですがファイルが終了しました", kind))),
        }
    }

    fn block(&mut self) -> Result<Block> {
        let keyword = self.expect(TokenKind::Ident)?;
        match keyword.text {
            "variable" => {
                let name = self.expect(TokenKind::String)?.text.to_string();
                let body = self.body()?;
                Ok(Block::Variable { name, body })
            }
            "provider" => {
                let name = self.expect(TokenKind::String)?.text.to_string();
                let body = self.body()?;
                Ok(Block::Provider { name, body })
            }
            "resource" => {
                let resource_type = self.expect(TokenKind::String)?.text.to_string();
                let name = self.expect(TokenKind::String)?.text.to_string();
                let body = self.body()?;
                Ok(Block::Resource {
                    resource_type,
                    name,
                    body,
                })
            }
            other => Err(error_at(
                self.source,
                keyword.span.start,
                format!("不明なブロックです: '{}'", other),
            )),
        }
    }

    fn body(&mut self) -> Result<Body> {
        self.expect(TokenKind::LBrace)?;
        let mut pairs = Vec::new();

        while self.peek_kind() != Some(TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.error("'}' が閉じられていません"));
            }
            let key = self.expect(TokenKind::Ident)?.text.to_string();
            self.expect(TokenKind::Eq)?;
            let value = self.expr()?;
            pairs.push(KeyValue { key, value });
        }

        self.expect(TokenKind::RBrace)?;
        Ok(Body { pairs })
    }

    fn expr(&mut self) -> Result<Expr> {
        if self.peek_kind() == Some(TokenKind::LBracket) {
            return self.list().map(Expr::List);
        }
        self.scalar().map(Expr::Scalar)
    }

    fn list(&mut self) -> Result<Vec<Expr>> {
        self.expect(TokenKind::LBracket)?;
        let mut items = Vec::new();

        while self.peek_kind() != Some(TokenKind::RBracket) {
            items.push(self.expr()?);
            if self.peek_kind() == Some(TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }

        self.expect(TokenKind::RBracket)?;
        Ok(items)
    }

    fn scalar(&mut self) -> Result<String> {
        let Some(token) = self.bump() else {
            return Err(self.error("式が必要ですがファイルが終了しました"));
        };

        match token.kind {
            TokenKind::String | TokenKind::Number => Ok(token.text.to_string()),
            TokenKind::Ident if self.peek_kind() == Some(TokenKind::LParen) => {
                self.call(token.text)
            }
            TokenKind::Ident => {
                // 参照: a.b.c / list.0.id
                let mut text = token.text.to_string();
                while self.peek_kind() == Some(TokenKind::Dot) {
                    self.bump();
                    let segment = match self.peek() {
                        Some(t) if matches!(t.kind, TokenKind::Ident | TokenKind::Number) => t.text,
                        _ => return Err(self.error("'.' の後に識別子が必要です")),
                    };
                    self.pos += 1;
                    text.push('.');
                    text.push_str(segment);
                }
                Ok(text)
            }
            _ => Err(error_at(
                self.source,
                token.span.start,
                format!("式が必要ですが '{}' が見つかりました", token.text),
            )),
        }
    }

    fn call(&mut self, function: &str) -> Result<String> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();

        while self.peek_kind() != Some(TokenKind::RParen) {
            args.push(self.expr()?.text());
            if self.peek_kind() == Some(TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok(format!("{}({})", function, args.join(",")))
    }
}
