//! Install manifest: system package sets and language runtimes.
//!
//! Pure data: the provisioning service decides how each entry is executed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A named group of apt packages installed with a single `apt-get install`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSet {
    pub name: String,
    pub packages: Vec<String>,
}

impl PackageSet {
    fn new(name: &str, packages: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            packages: packages.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

/// Default package manifest, in install order.
#[must_use]
pub fn default_packages() -> Vec<PackageSet> {
    vec![
        PackageSet::new("base-tools", &["curl", "ca-certificates", "git", "unzip", "tar"]),
        PackageSet::new("web-server", &["nginx"]),
        PackageSet::new(
            "php",
            &[
                "php-fpm",
                "php-cli",
                "php-mysql",
                "php-curl",
                "php-gd",
                "php-mbstring",
                "php-xml",
                "php-zip",
            ],
        ),
        PackageSet::new("database", &["mariadb-server", "mariadb-client"]),
        PackageSet::new("mail", &["postfix", "dovecot-imapd", "dovecot-pop3d"]),
        PackageSet::new("tls", &["certbot", "python3-certbot-nginx"]),
        PackageSet::new("cache", &["redis-server", "memcached"]),
        PackageSet::new("ftp", &["vsftpd"]),
    ]
}

/// How a language runtime gets onto the host when it is not already on PATH.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RuntimeInstaller {
    /// Download a `.tar.gz` and unpack it under `dest`; `bin_dir` joins the search path.
    Archive {
        url: String,
        dest: PathBuf,
        bin_dir: PathBuf,
    },
    /// Download a setup script, run it with bash, then apt-install `packages`.
    Script {
        url: String,
        #[serde(default)]
        packages: Vec<String>,
    },
}

/// A language runtime, looked up by `executable` before installing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSpec {
    pub name: String,
    pub executable: String,
    pub installer: RuntimeInstaller,
    /// npm packages installed globally once the runtime is present.
    #[serde(default)]
    pub global_packages: Vec<String>,
}

impl RuntimeSpec {
    /// Directory added to the search path by this runtime, if any.
    #[must_use]
    pub fn bin_dir(&self) -> Option<&std::path::Path> {
        match &self.installer {
            RuntimeInstaller::Archive { bin_dir, .. } => Some(bin_dir),
            RuntimeInstaller::Script { .. } => None,
        }
    }
}

/// Default runtimes: Node.js (with pm2 as the process supervisor) and Go.
#[must_use]
pub fn default_runtimes() -> Vec<RuntimeSpec> {
    vec![
        RuntimeSpec {
            name: "nodejs".to_string(),
            executable: "node".to_string(),
            installer: RuntimeInstaller::Script {
                url: "https://deb.nodesource.com/setup_20.x".to_string(),
                packages: vec!["nodejs".to_string()],
            },
            global_packages: vec!["pm2".to_string()],
        },
        RuntimeSpec {
            name: "go".to_string(),
            executable: "go".to_string(),
            installer: RuntimeInstaller::Archive {
                url: "https://go.dev/dl/go1.22.5.linux-amd64.tar.gz".to_string(),
                dest: PathBuf::from("/usr/local"),
                bin_dir: PathBuf::from("/usr/local/go/bin"),
            },
            global_packages: Vec::new(),
        },
    ]
}
