use mixbuild::engine::BuildArgs;
use mixbuild::parse_version;
use mixbuild::utils::builder_toml::{load_builder_toml, parse_builder_toml, resolve};
use std::path::{Path, PathBuf};

const FULL_CONFIG: &str = r#"
[builder]
server_state_dir = "/srv/update"
cert = "/etc/mix/Swupd_Root.pem"

[mix]
version = "20"
previous_version = "10"
min_version = "5"
format = "3"

[swupd]
compression = ["external-xz", "external-gzip"]

[workers]
bundle = 2
fullfile = 6
delta = 3

[tools]
compressor = { program = "xz", args = ["-9", "--stdout"] }
signer = "/usr/local/bin/openssl"
fullfiles = { program = "make-fullfiles", args = ["--out", "{output_dir}"] }
packs = { program = "make-pack", args = ["{bundle}", "{from}", "{to}"] }
"#;

// --- parse_version ---

#[test]
fn test_parse_version_accepts_u32() {
    assert_eq!(parse_version("0").unwrap(), 0);
    assert_eq!(parse_version(" 31570\n").unwrap(), 31570);
    assert_eq!(parse_version("4294967295").unwrap(), u32::MAX);
}

#[test]
fn test_parse_version_rejects_garbage() {
    assert!(parse_version("").is_err());
    assert!(parse_version("-1").is_err());
    assert!(parse_version("20a").is_err());
    assert!(parse_version("4294967296").is_err());
}

// --- builder.toml ---

#[test]
fn test_full_config_resolves() {
    let file = parse_builder_toml(FULL_CONFIG).unwrap();
    let (ctx, _services) = resolve(file, &BuildArgs::default()).unwrap();

    assert_eq!(ctx.state_dir, PathBuf::from("/srv/update"));
    assert_eq!((ctx.version, ctx.previous, ctx.min_version, ctx.format), (20, 10, 5, 3));
    assert_eq!((ctx.workers.bundle, ctx.workers.fullfile, ctx.workers.delta), (2, 6, 3));
    assert_eq!(ctx.compression, ["external-xz", "external-gzip"]);
    assert_eq!(ctx.archiver.compressor.program, "xz");
    assert_eq!(ctx.archiver.compressor.args, ["-9", "--stdout"]);
    assert_eq!(ctx.signer.program, "/usr/local/bin/openssl");
    assert_eq!(ctx.signer.private_key(), Path::new("/etc/mix/private.pem"));
    assert_eq!(ctx.version_dir(), Path::new("/srv/update/www/20"));
    assert_eq!(ctx.full_chroot(), Path::new("/srv/update/image/20/full"));
    assert_eq!(ctx.fullfiles_dir(), Path::new("/srv/update/www/20/files"));
}

#[test]
fn test_resolved_services_are_debuggable() {
    let (_, services) = resolve(parse_builder_toml(FULL_CONFIG).unwrap(), &BuildArgs::default()).unwrap();
    assert!(format!("{:?}", services).starts_with("Services"));
}

#[test]
fn test_cli_overrides_file() {
    let file = parse_builder_toml(FULL_CONFIG).unwrap();
    let args = BuildArgs {
        build_version: Some("30".to_string()),
        previous: Some("20".to_string()),
        state_dir: Some(PathBuf::from("/tmp/state")),
        delta_workers: Some(1),
        skip_signing: true,
        ..Default::default()
    };
    let (ctx, _) = resolve(file, &args).unwrap();

    assert_eq!((ctx.version, ctx.previous), (30, 20));
    assert_eq!(ctx.state_dir, PathBuf::from("/tmp/state"));
    assert_eq!(ctx.workers.delta, 1);
    assert_eq!(ctx.workers.bundle, 2);
    assert!(ctx.skip.signing);
    assert!(!ctx.skip.packs);
}

#[test]
fn test_defaults_from_cli_only() {
    let args = BuildArgs {
        build_version: Some("10".to_string()),
        state_dir: Some(PathBuf::from("/srv")),
        skip_signing: true,
        ..Default::default()
    };
    let (ctx, _) = resolve(parse_builder_toml("").unwrap(), &args).unwrap();

    assert_eq!((ctx.previous, ctx.min_version, ctx.format), (0, 0, 1));
    assert_eq!(ctx.compression, ["external-xz"]);
    assert_eq!(ctx.archiver.compressor.program, "xz");
    assert!(ctx.workers.delta >= 1);
}

#[test]
fn test_missing_version_is_error() {
    let args = BuildArgs {
        state_dir: Some(PathBuf::from("/srv")),
        skip_signing: true,
        ..Default::default()
    };
    let err = resolve(parse_builder_toml("").unwrap(), &args).unwrap_err();
    assert!(err.to_string().contains("no build version"));
}

#[test]
fn test_invalid_version_names_key() {
    let file = parse_builder_toml("[mix]\nprevious_version = \"ten\"\n").unwrap();
    let args = BuildArgs {
        build_version: Some("20".to_string()),
        state_dir: Some(PathBuf::from("/srv")),
        skip_signing: true,
        ..Default::default()
    };
    let err = resolve(file, &args).unwrap_err();
    assert!(format!("{:#}", err).contains("previous_version"));
}

#[test]
fn test_version_not_after_previous_rejected() {
    let args = BuildArgs {
        build_version: Some("10".to_string()),
        previous: Some("10".to_string()),
        state_dir: Some(PathBuf::from("/srv")),
        skip_signing: true,
        ..Default::default()
    };
    let err = resolve(parse_builder_toml("").unwrap(), &args).unwrap_err();
    assert!(err.to_string().contains("must be greater than previous"));
}

#[test]
fn test_zero_workers_rejected() {
    let args = BuildArgs {
        build_version: Some("10".to_string()),
        state_dir: Some(PathBuf::from("/srv")),
        skip_signing: true,
        bundle_workers: Some(0),
        ..Default::default()
    };
    let err = resolve(parse_builder_toml("").unwrap(), &args).unwrap_err();
    assert!(err.to_string().contains("bundle worker count"));
}

#[test]
fn test_signing_requires_cert() {
    let args = BuildArgs {
        build_version: Some("10".to_string()),
        state_dir: Some(PathBuf::from("/srv")),
        ..Default::default()
    };
    let err = resolve(parse_builder_toml("").unwrap(), &args).unwrap_err();
    assert!(err.to_string().contains("certificate"));
}

#[test]
fn test_unknown_section_rejected() {
    assert!(parse_builder_toml("[bogus]\nx = 1\n").is_err());
}

#[test]
fn test_missing_config_file_is_empty_config() {
    let dir = tempfile::tempdir().unwrap();
    let file = load_builder_toml(&dir.path().join("builder.toml")).unwrap();
    assert!(file.builder.server_state_dir.is_none());
    assert!(file.tools.packs.is_none());
}

#[test]
fn test_config_file_loaded_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("builder.toml");
    std::fs::write(&path, FULL_CONFIG).unwrap();
    let file = load_builder_toml(&path).unwrap();
    assert_eq!(file.mix.version.as_deref(), Some("20"));
}
