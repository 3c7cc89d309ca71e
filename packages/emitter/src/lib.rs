//! Declaration-only TypeScript emitter
//!
//! A lightweight stand-in for `tsc --declaration --emitDeclarationOnly`: it
//! builds a program by following relative imports through a [`CompilerHost`],
//! then writes one `.d.ts` per source file back through the same host. It
//! performs no type checking; declarations are derived syntactically.
//!
//! [`CompilerHost`]: sveltedts_common::CompilerHost

mod declarations;
mod emitter;
mod lexer;
mod program;
mod resolver;
mod scanner;

pub use declarations::emit_declarations;
pub use emitter::{declaration_path, DtsEmitter};
pub use lexer::{tokenize, Tok, Token};
pub use program::{Program, SourceFile};
pub use resolver::{module_specifiers, resolution_candidates, ModuleResolver};
pub use scanner::{scan, split_statements, Statement};
