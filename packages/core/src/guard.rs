use std::path::Path;
use sveltedts_common::paths::{append_suffix, DECLARATION_SUFFIX, INTERMEDIATE_SUFFIX, TYPED_SUFFIX};
use sveltedts_common::{CommonError, CommonResult, FileSystem, TypedKind};

/// Decide whether a virtual entry may be synthesized for `component`
///
/// A hand-authored `.ts`/`.tsx` sibling is a conflict and aborts the run. An
/// existing `.d.ts` sibling means the component is already typed: `Ok(false)`.
/// Checks always hit the real file system, never the overlay.
pub fn should_create_virtual(component: &Path, fs: &dyn FileSystem) -> CommonResult<bool> {
    for (suffix, kind) in [(TYPED_SUFFIX, TypedKind::Ts), (INTERMEDIATE_SUFFIX, TypedKind::Tsx)] {
        let typed_path = append_suffix(component, suffix);
        if fs.exists(&typed_path) {
            return Err(CommonError::Conflict {
                kind,
                typed_path,
                component_path: component.to_path_buf(),
            });
        }
    }

    if fs.exists(&append_suffix(component, DECLARATION_SUFFIX)) {
        return Ok(false);
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use sveltedts_common::MockFileSystem;

    const BUTTON: &str = "/proj/src/Button.svelte";

    #[test]
    fn test_clean_component_is_accepted() {
        let fs = MockFileSystem::new().with_file(BUTTON, "<button />");
        assert!(should_create_virtual(Path::new(BUTTON), &fs).unwrap());
    }

    #[test]
    fn test_existing_declaration_is_respected() {
        let fs = MockFileSystem::new()
            .with_file(BUTTON, "<button />")
            .with_file("/proj/src/Button.svelte.d.ts", "export {};");
        assert!(!should_create_virtual(Path::new(BUTTON), &fs).unwrap());
    }

    #[test]
    fn test_intermediate_sibling_conflicts() {
        let fs = MockFileSystem::new()
            .with_file(BUTTON, "<button />")
            .with_file("/proj/src/Button.svelte.tsx", "export {};");

        let err = should_create_virtual(Path::new(BUTTON), &fs).unwrap_err();
        match &err {
            CommonError::Conflict {
                kind,
                typed_path,
                component_path,
            } => {
                assert_eq!(*kind, TypedKind::Tsx);
                assert_eq!(typed_path, &PathBuf::from("/proj/src/Button.svelte.tsx"));
                assert_eq!(component_path, &PathBuf::from(BUTTON));
            }
            other => panic!("expected conflict, got {:?}", other),
        }

        let message = err.to_string();
        assert!(message.contains("Button.svelte.tsx"));
        assert!(message.contains("Button.svelte\""));
    }

    #[test]
    fn test_typed_sibling_wins_over_declaration() {
        let fs = MockFileSystem::new()
            .with_file(BUTTON, "<button />")
            .with_file("/proj/src/Button.svelte.ts", "export {};")
            .with_file("/proj/src/Button.svelte.d.ts", "export {};");

        let err = should_create_virtual(Path::new(BUTTON), &fs).unwrap_err();
        assert!(err.to_string().starts_with("Ts file "));
    }
}
