use super::*;
use crate::resolver::resolve;
use crate::syntax::parse_source;
use std::fs;

fn interpret_str(source: &str, home: &Path) -> Result<Interpretation> {
    let file = parse_source(source).unwrap();
    Interpreter::with_home_dir(home).interpret(&file)
}

#[test]
fn test_interpret_full_configuration() {
    let home = tempfile::tempdir().unwrap();
    let source = r#"
        provider "digitalocean" {
          token = var.token
        }

        variable "token" {
          default = "abc"
        }

        resource "digitalocean_droplet" "web" {
          name     = "web"
          region   = "nyc1"
          size     = "s-1vcpu-1gb"
          image    = "ubuntu-22-04-x64"
          ssh_keys = [digitalocean_ssh_key.default.id]
        }
    "#;

    let result = interpret_str(source, home.path()).unwrap();

    assert_eq!(result.variables.get("token"), Some("abc"));
    assert_eq!(
        result.token,
        Some(TokenExpr::VariableRef("token".to_string()))
    );
    assert_eq!(resolve(result.token.as_ref(), &result.variables).unwrap(), "abc");

    let droplet = result.droplet.unwrap();
    assert_eq!(droplet.resource_name, "web");
    assert_eq!(droplet.scalar("name"), Some("web"));
    assert_eq!(droplet.scalar("region"), Some("nyc1"));
    assert_eq!(droplet.scalar("size"), Some("s-1vcpu-1gb"));
    assert_eq!(droplet.scalar("image"), Some("ubuntu-22-04-x64"));
    assert_eq!(
        droplet.get("ssh_keys"),
        Some(&AttrValue::List(vec![
            "digitalocean_ssh_key.default.id".to_string()
        ]))
    );
    assert_eq!(
        droplet.ssh_key_reference.as_deref(),
        Some("digitalocean_ssh_key.default.id")
    );
    assert!(droplet.ssh_key_content.is_none());
    assert!(droplet.ssh_key_path.is_none());
}

#[test]
fn test_variable_without_default_is_not_recorded() {
    let home = tempfile::tempdir().unwrap();
    let result = interpret_str(
        r#"
        variable "token" {
          description = "API token"
        }
        variable "region" {
          default = "ams3"
        }
        "#,
        home.path(),
    )
    .unwrap();

    assert_eq!(result.variables.get("token"), None);
    assert_eq!(result.variables.get("region"), Some("ams3"));
    assert_eq!(result.variables.len(), 1);
}

#[test]
fn test_unsupported_provider() {
    let home = tempfile::tempdir().unwrap();
    let err = interpret_str(
        r#"
        provider "aws" { token = "x" }
        resource "digitalocean_droplet" "web" { name = "web" }
        "#,
        home.path(),
    )
    .unwrap_err();

    assert!(matches!(&err, FlowError::UnsupportedProvider(name) if name == "aws"));
}

#[test]
fn test_duplicate_provider() {
    let home = tempfile::tempdir().unwrap();
    let err = interpret_str(
        r#"
        provider "digitalocean" { token = "a" }
        provider "digitalocean" { token = "b" }
        "#,
        home.path(),
    )
    .unwrap_err();

    assert!(matches!(err, FlowError::DuplicateProvider));
}

#[test]
fn test_literal_token_keeps_raw_text_until_resolved() {
    let home = tempfile::tempdir().unwrap();
    let result = interpret_str(
        r#"provider "digitalocean" { token = "dop_v1_xyz" }"#,
        home.path(),
    )
    .unwrap();

    assert_eq!(
        result.token,
        Some(TokenExpr::Literal("dop_v1_xyz".to_string()))
    );
    assert!(result.droplet.is_none());
}

#[test]
fn test_other_resource_types_are_skipped() {
    let home = tempfile::tempdir().unwrap();
    let result = interpret_str(
        r#"
        resource "digitalocean_ssh_key" "default" {
          name = "default"
          public_key = file("~/.ssh/missing.pub")
        }
        "#,
        home.path(),
    )
    .unwrap();

    assert!(result.droplet.is_none());
}

#[test]
fn test_only_first_droplet_is_honored() {
    let home = tempfile::tempdir().unwrap();
    let result = interpret_str(
        r#"
        resource "digitalocean_droplet" "first" { name = "first" }
        resource "digitalocean_droplet" "second" { name = "second" }
        "#,
        home.path(),
    )
    .unwrap();

    let droplet = result.droplet.unwrap();
    assert_eq!(droplet.resource_name, "first");
    assert_eq!(droplet.scalar("name"), Some("first"));
}

#[test]
fn test_ssh_keys_must_be_list() {
    let home = tempfile::tempdir().unwrap();
    let err = interpret_str(
        r#"
        resource "digitalocean_droplet" "web" {
          name = "web"
          ssh_keys = "digitalocean_ssh_key.default.id"
        }
        "#,
        home.path(),
    )
    .unwrap_err();

    assert!(matches!(err, FlowError::InvalidSshKeysType(_)));
}

#[test]
fn test_ssh_key_file_is_loaded_and_trimmed() {
    let home = tempfile::tempdir().unwrap();
    let ssh_dir = home.path().join(".ssh");
    fs::create_dir_all(&ssh_dir).unwrap();
    fs::write(
        ssh_dir.join("id_rsa.pub"),
        "ssh-rsa AAAAB3NzaC1yc2E user@host\n\n",
    )
    .unwrap();

    let result = interpret_str(
        r#"
        resource "digitalocean_droplet" "web" {
          name = "web"
          ssh_keys = [file("~/.ssh/id_rsa.pub")]
        }
        "#,
        home.path(),
    )
    .unwrap();

    let droplet = result.droplet.unwrap();
    assert_eq!(
        droplet.ssh_key_content.as_deref(),
        Some("ssh-rsa AAAAB3NzaC1yc2E user@host")
    );
    assert_eq!(droplet.ssh_key_path, Some(ssh_dir.join("id_rsa.pub")));
    assert!(droplet.ssh_key_reference.is_none());
}

#[test]
fn test_ssh_key_file_not_found() {
    let home = tempfile::tempdir().unwrap();
    let err = interpret_str(
        r#"
        resource "digitalocean_droplet" "web" {
          ssh_keys = [file("~/.ssh/id_ed25519.pub")]
        }
        "#,
        home.path(),
    )
    .unwrap_err();

    let expected = home.path().join(".ssh/id_ed25519.pub");
    match &err {
        FlowError::SshKeyFileNotFound { path } => assert_eq!(path, &expected),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("id_ed25519.pub"));
}

#[test]
fn test_ssh_keys_with_reference_and_file() {
    let home = tempfile::tempdir().unwrap();
    let key_path = home.path().join("deploy.pub");
    fs::write(&key_path, "ssh-ed25519 AAAAC3Nz deploy").unwrap();

    let source = format!(
        r#"
        resource "digitalocean_droplet" "web" {{
          ssh_keys = [digitalocean_ssh_key.default.id, file("{}")]
        }}
        "#,
        key_path.display()
    );
    let result = interpret_str(&source, home.path()).unwrap();

    let droplet = result.droplet.unwrap();
    assert_eq!(
        droplet.ssh_key_reference.as_deref(),
        Some("digitalocean_ssh_key.default.id")
    );
    assert_eq!(droplet.ssh_key_content.as_deref(), Some("ssh-ed25519 AAAAC3Nz deploy"));
    assert_eq!(droplet.ssh_key_path, Some(key_path));
}

#[test]
fn test_expand_home_only_leading_tilde() {
    let home = Path::new("/home/deploy");
    assert_eq!(
        expand_home_with("~/.ssh/id_rsa.pub", Some(home)),
        PathBuf::from("/home/deploy/.ssh/id_rsa.pub")
    );
    assert_eq!(
        expand_home_with("/keys/~backup.pub", Some(home)),
        PathBuf::from("/keys/~backup.pub")
    );
    assert_eq!(
        expand_home_with("~/.ssh/id_rsa.pub", None),
        PathBuf::from("~/.ssh/id_rsa.pub")
    );
    assert_eq!(expand_home_with("~", Some(home)), PathBuf::from("/home/deploy"));
}

#[test]
fn test_expand_home_leaves_other_users_alone() {
    let home = Path::new("/home/deploy");
    assert_eq!(
        expand_home_with("~alice/.ssh/id.pub", Some(home)),
        PathBuf::from("~alice/.ssh/id.pub")
    );
    assert_eq!(
        expand_home_with("~alice", Some(home)),
        PathBuf::from("~alice")
    );
}
