use tempfile::tempdir;

use fspath::File;

#[tokio::test]
async fn write_then_read_roundtrips_text() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("greeting.txt"));

    file.write("hello there", true).await?;
    assert_eq!(file.read().await?, "hello there");
    Ok(())
}

#[tokio::test]
async fn write_then_read_roundtrips_binary() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("blob.bin"));

    // Not valid UTF-8, so this must go through the byte paths.
    let payload = vec![0u8, 159, 146, 150, 255];
    file.write(&payload, true).await?;
    assert_eq!(file.read_bytes().await?, payload);
    Ok(())
}

// The content cache serves repeated reads until something invalidates it,
// so an external change is only observed after an explicit invalidate.
#[tokio::test]
async fn read_caches_until_invalidated() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let path = sandbox.path().join("cached.txt");
    let mut file = File::new(&path);

    file.write("first", true).await?;
    assert_eq!(file.read().await?, "first");

    std::fs::write(&path, "second")?;
    assert_eq!(file.read().await?, "first", "cache should still serve");

    file.invalidate();
    assert_eq!(file.read().await?, "second");
    Ok(())
}

// The metadata cache has the same one-call-per-lifetime discipline as the
// content cache: an external change is only observed after an explicit
// invalidate.
#[tokio::test]
async fn size_serves_cached_metadata_until_invalidated() -> Result<(), Box<dyn std::error::Error>>
{
    let sandbox = tempdir()?;
    let path = sandbox.path().join("growing.txt");
    let mut file = File::new(&path);

    file.write("12345", true).await?;
    assert_eq!(file.size().await?, 5);

    std::fs::write(&path, "12345678")?;
    assert_eq!(file.size().await?, 5, "cache should still serve");

    file.invalidate();
    assert_eq!(file.size().await?, 8);
    Ok(())
}

#[tokio::test]
async fn write_creates_missing_parents_when_asked() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("a/b/c/deep.txt"));

    file.write("nested", true).await?;
    assert_eq!(file.read().await?, "nested");
    Ok(())
}

#[tokio::test]
async fn write_without_parents_fails_on_missing_parent() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("missing/parent.txt"));

    assert!(file.write("nope", false).await.is_err());
    Ok(())
}

#[tokio::test]
async fn ensure_is_idempotent_and_preserves_content() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("keep.txt"));

    file.ensure().await?;
    assert!(file.exists().await?);
    assert_eq!(file.size().await?, 0);

    file.write("precious", true).await?;
    file.ensure().await?;
    file.ensure().await?;
    assert_eq!(file.read().await?, "precious");
    Ok(())
}

#[tokio::test]
async fn create_truncates_existing_content() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("trunc.txt"));

    file.write("something", true).await?;
    file.create(true).await?;
    assert_eq!(file.size().await?, 0);
    Ok(())
}

#[tokio::test]
async fn size_reports_byte_length() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("sized.txt"));

    file.write("12345", true).await?;
    assert_eq!(file.size().await?, 5);
    Ok(())
}

#[tokio::test]
async fn exists_is_false_never_an_error_for_missing_path() -> Result<(), Box<dyn std::error::Error>>
{
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("not_here.txt"));

    assert!(!file.exists().await?);
    Ok(())
}

// `exists` means "exists as a regular file": a directory at the path is
// not a file, but it is not an error either.
#[tokio::test]
async fn exists_is_false_for_directory_at_path() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let dir_path = sandbox.path().join("actually_a_dir");
    std::fs::create_dir(&dir_path)?;

    let mut file = File::new(&dir_path);
    assert!(!file.exists().await?);
    Ok(())
}

#[tokio::test]
async fn remove_fails_for_missing_file() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("ghost.txt"));

    assert!(file.remove().await.is_err());
    Ok(())
}

#[tokio::test]
async fn remove_deletes_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("short_lived.txt"));

    file.write("x", true).await?;
    file.remove().await?;
    assert!(!file.exists().await?);
    Ok(())
}

#[tokio::test]
async fn copy_into_existing_directory_keeps_name() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("orig.txt"));
    file.write("copy me", true).await?;

    let dest_dir = sandbox.path().join("dest");
    std::fs::create_dir(&dest_dir)?;
    file.copy_to(&dest_dir).await?;

    assert_eq!(std::fs::read_to_string(dest_dir.join("orig.txt"))?, "copy me");
    // Source is untouched.
    assert_eq!(file.read().await?, "copy me");
    Ok(())
}

#[tokio::test]
async fn copy_to_explicit_path() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("orig.txt"));
    file.write("copy me", true).await?;

    let dest = sandbox.path().join("sub/copied.txt");
    file.copy_to(&dest).await?;
    assert_eq!(std::fs::read_to_string(dest)?, "copy me");
    Ok(())
}

// Resolving the destination stats it; a failure there other than NotFound
// must surface instead of being read as "destination is a file path".
#[cfg(unix)]
#[tokio::test]
async fn copy_to_propagates_unreadable_destination() -> Result<(), Box<dyn std::error::Error>> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("src.txt"));
    file.write("content", true).await?;

    let blocked = sandbox.path().join("blocked");
    std::fs::create_dir(&blocked)?;
    std::fs::set_permissions(&blocked, Permissions::from_mode(0o000))?;

    let result = file.copy_to(blocked.join("dest.txt")).await;
    std::fs::set_permissions(&blocked, Permissions::from_mode(0o755))?;

    let err = result.unwrap_err();
    assert!(
        !err.is_not_found(),
        "a permission failure must not be read as absence: {err}"
    );
    Ok(())
}

#[tokio::test]
async fn move_to_modifying_tracks_destination() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let old_path = sandbox.path().join("before.txt");
    let new_path = sandbox.path().join("after.txt");

    let mut file = File::new(&old_path);
    file.write("contents", true).await?;
    file.move_to(&new_path, true).await?;

    assert_eq!(file.as_path(), new_path.as_path());
    assert_eq!(file.read().await?, "contents");
    assert!(!old_path.exists());
    Ok(())
}

#[tokio::test]
async fn move_to_non_modifying_leaves_stale_handle() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let old_path = sandbox.path().join("before.txt");
    let new_path = sandbox.path().join("after.txt");

    let mut file = File::new(&old_path);
    file.write("contents", true).await?;
    file.move_to(&new_path, false).await?;

    // The handle still points at the old, now-missing path.
    assert_eq!(file.as_path(), old_path.as_path());
    assert!(!file.exists().await?);
    assert_eq!(std::fs::read_to_string(new_path)?, "contents");
    Ok(())
}

#[tokio::test]
async fn rename_to_stays_within_parent() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("sub/old_name.txt"));
    file.write("renamed", true).await?;

    file.rename_to("new_name.txt", true).await?;
    assert_eq!(
        file.as_path(),
        sandbox.path().join("sub/new_name.txt").as_path()
    );
    assert_eq!(file.read().await?, "renamed");
    Ok(())
}

#[tokio::test]
async fn write_atomic_leaves_no_temp_files() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("atomic.txt"));

    file.write_atomic("all or nothing").await?;
    assert_eq!(file.read().await?, "all or nothing");

    for entry in std::fs::read_dir(sandbox.path())? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        assert!(
            !name.starts_with(".tmp_write."),
            "temp file left behind: {name}"
        );
    }
    Ok(())
}

#[tokio::test]
async fn append_extends_existing_file() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("log.txt"));

    file.write("one", true).await?;
    file.append(" two").await?;
    assert_eq!(file.read().await?, "one two");
    Ok(())
}

#[tokio::test]
async fn append_fails_for_missing_file() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let mut file = File::new(sandbox.path().join("no_log.txt"));

    assert!(file.append("entry").await.is_err());
    Ok(())
}

// Handles are independent: each carries its own caches, so one observing
// a write does not refresh the other.
#[tokio::test]
async fn two_handles_for_one_path_cache_independently(
) -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = tempdir()?;
    let path = sandbox.path().join("shared.txt");

    let mut writer = File::new(&path);
    let mut reader = File::new(&path);

    writer.write("v1", true).await?;
    assert_eq!(reader.read().await?, "v1");

    writer.write("longer v2", true).await?;
    // reader still serves its cached copy.
    assert_eq!(reader.read().await?, "v1");
    reader.invalidate();
    assert_eq!(reader.read().await?, "longer v2");
    Ok(())
}
