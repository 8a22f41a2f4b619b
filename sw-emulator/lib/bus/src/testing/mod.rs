/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains exports for code useful for testing Bus traits.

--*/
mod access_log;

pub use access_log::{Access, AccessKind, AccessLog};
