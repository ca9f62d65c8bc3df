// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use funcscript_var::Span;
use strum::{Display, EnumString};

/// Syntax categories of the diagnostic parse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum ParseNodeType {
    RootExpression,
    WhiteSpace,
    Comment,
    Operator,
    KeyWord,
    Identifier,
    Key,
    LiteralInteger,
    LiteralLong,
    LiteralFloat,
    LiteralString,
    LiteralBoolean,
    LiteralNull,
    StringTemplate,
    OpenBrace,
    CloseBrace,
    ListSeparator,
    Colon,
    LambdaArrow,
    ThirdOperandDelimiter,
    List,
    KeyValueCollection,
    KeyValuePair,
    ExpressionInBrace,
    FunctionParameterList,
    IdentifierList,
    LambdaExpression,
    PrefixOperatorExpression,
    InfixExpression,
    GeneralInfixExpression,
    MemberAccess,
    Selector,
    IfExpression,
    Case,
    Switch,
    LanguageBinding,
}

/// A node of the diagnostic parse tree. The tree is built alongside the AST for tooling
/// (highlighting, error display) and plays no part in evaluation. Children are in source order
/// and never overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNode {
    pub kind: ParseNodeType,
    pub span: Span,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn leaf(kind: ParseNodeType, span: Span) -> Self {
        Self {
            kind,
            span,
            children: vec![],
        }
    }

    pub fn new(kind: ParseNodeType, span: Span, children: Vec<ParseNode>) -> Self {
        Self {
            kind,
            span,
            children,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, ParseNodeType::WhiteSpace | ParseNodeType::Comment)
    }

    /// Check if this node represents source content (not whitespace/comments)
    pub fn is_content(&self) -> bool {
        !self.is_whitespace()
    }

    /// The source text under this node.
    pub fn text<'a>(&self, source: &'a str) -> Option<&'a str> {
        self.span.slice(source)
    }

    /// Pre-order walk of the subtree, this node first.
    pub fn find_all_nodes(&self) -> Vec<&ParseNode> {
        let mut nodes = Vec::new();
        self.find_all_nodes_recursive(&mut nodes);
        nodes
    }

    fn find_all_nodes_recursive<'a>(&'a self, nodes: &mut Vec<&'a ParseNode>) {
        nodes.push(self);
        for child in &self.children {
            child.find_all_nodes_recursive(nodes);
        }
    }

    pub fn find_comments(&self) -> Vec<&ParseNode> {
        self.find_all_nodes()
            .into_iter()
            .filter(|n| n.kind == ParseNodeType::Comment)
            .collect()
    }

    /// Flatten the subtree to its leaves, filling any gap between siblings with a synthesized
    /// whitespace leaf so that the result tiles this node's span exactly.
    pub fn leaves_with_gaps(&self) -> Vec<ParseNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<ParseNode>) {
        if self.children.is_empty() {
            out.push(self.clone());
            return;
        }
        let mut cursor = self.span.pos;
        for child in &self.children {
            if child.span.pos > cursor {
                out.push(ParseNode::leaf(
                    ParseNodeType::WhiteSpace,
                    Span::between(cursor, child.span.pos),
                ));
            }
            child.collect_leaves(out);
            cursor = cursor.max(child.span.end());
        }
        if self.span.end() > cursor {
            out.push(ParseNode::leaf(
                ParseNodeType::WhiteSpace,
                Span::between(cursor, self.span.end()),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaves_fill_gaps() {
        let node = ParseNode::new(
            ParseNodeType::InfixExpression,
            Span::new(0, 5),
            vec![
                ParseNode::leaf(ParseNodeType::LiteralInteger, Span::new(0, 1)),
                ParseNode::leaf(ParseNodeType::Operator, Span::new(2, 1)),
                ParseNode::leaf(ParseNodeType::LiteralInteger, Span::new(4, 1)),
            ],
        );
        let leaves = node.leaves_with_gaps();
        assert_eq!(leaves.len(), 5);
        assert_eq!(leaves[1].kind, ParseNodeType::WhiteSpace);
        assert_eq!(leaves[1].span, Span::new(1, 1));
        let total: usize = leaves.iter().map(|l| l.span.len).sum();
        assert_eq!(total, 5);
    }
}
