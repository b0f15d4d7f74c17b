//! In-memory virtual file system behind the file manager page.
//!
//! Nodes live in a flat arena and refer to each other by index, so moving the
//! cursor or renaming a directory never fights the borrow checker.  Removed
//! nodes are unlinked from their parent and simply become unreachable.

use chrono::NaiveDateTime;
use thiserror::Error;

use super::format::human_size;
use super::mock::at;
use super::records::{EntryKind, FileEntry};
use super::validate::{self, ValidationError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VfsError {
    #[error("\"{0}\" not found")]
    NotFound(String),
    #[error("\"{0}\" already exists")]
    AlreadyExists(String),
    #[error("\"{0}\" is not a directory")]
    NotADirectory(String),
    #[error("\"{0}\" is a directory")]
    IsADirectory(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, VfsError>;

/// Index into [`Vfs::nodes`].
pub type NodeId = usize;

#[derive(Debug, Clone)]
struct Node {
    entry: FileEntry,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Vfs {
    nodes: Vec<Node>,
    root: NodeId,
    cwd: NodeId,
}

impl Vfs {
    pub fn new() -> Self {
        let root = Node {
            entry: FileEntry {
                name: String::new(),
                path: "/".into(),
                kind: EntryKind::Directory,
                size: 4096,
                permissions: "drwxr-xr-x".into(),
                owner: "root".into(),
                group: "root".into(),
                modified: at("2024-01-15 10:00:00"),
            },
            parent: None,
            children: Vec::new(),
            content: None,
        };
        Self {
            nodes: vec![root],
            root: 0,
            cwd: 0,
        }
    }

    fn add_child(&mut self, parent: NodeId, mut entry: FileEntry, content: Option<String>) -> NodeId {
        entry.path = join(&self.nodes[parent].entry.path, &entry.name);
        let id = self.nodes.len();
        self.nodes.push(Node {
            entry,
            parent: Some(parent),
            children: Vec::new(),
            content,
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Absolute path of the current directory.
    pub fn cwd(&self) -> &str {
        &self.nodes[self.cwd].entry.path
    }

    /// `["/", "home", "deploy"]` for `/home/deploy`.
    pub fn breadcrumb(&self) -> Vec<&str> {
        let mut parts = Vec::new();
        let mut id = Some(self.cwd);
        while let Some(n) = id {
            if n == self.root {
                parts.push("/");
            } else {
                parts.push(self.nodes[n].entry.name.as_str());
            }
            id = self.nodes[n].parent;
        }
        parts.reverse();
        parts
    }

    /// Entries of the current directory, in insertion order.
    pub fn list(&self) -> Vec<&FileEntry> {
        self.nodes[self.cwd]
            .children
            .iter()
            .map(|&c| &self.nodes[c].entry)
            .collect()
    }

    fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[dir]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].entry.name == name)
    }

    fn lookup(&self, name: &str) -> Result<NodeId> {
        self.lookup_in(self.cwd, name)
    }

    fn lookup_in(&self, dir: NodeId, name: &str) -> Result<NodeId> {
        self.child(dir, name)
            .ok_or_else(|| VfsError::NotFound(name.to_string()))
    }

    /// The directory node at absolute path `dir`.
    fn dir_at(&self, dir: &str) -> Result<NodeId> {
        let id = self
            .resolve(dir)
            .ok_or_else(|| VfsError::NotFound(dir.to_string()))?;
        if !self.nodes[id].entry.is_dir() {
            return Err(VfsError::NotADirectory(dir.to_string()));
        }
        Ok(id)
    }

    fn resolve(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|p| !p.is_empty())
            .try_fold(self.root, |dir, part| self.child(dir, part))
    }

    /// Move into the sub-directory `name` of the current directory.
    pub fn enter(&mut self, name: &str) -> Result<()> {
        let id = self.lookup(name)?;
        if !self.nodes[id].entry.is_dir() {
            return Err(VfsError::NotADirectory(name.to_string()));
        }
        self.cwd = id;
        Ok(())
    }

    /// Jump to an absolute path.
    pub fn cd(&mut self, path: &str) -> Result<()> {
        self.cwd = self.dir_at(path)?;
        Ok(())
    }

    /// Go to the parent directory.  Returns `false` when already at `/`.
    pub fn up(&mut self) -> bool {
        match self.nodes[self.cwd].parent {
            Some(parent) => {
                self.cwd = parent;
                true
            }
            None => false,
        }
    }

    /// Contents of a file in the current directory, or a summary for files
    /// without known text.
    pub fn read(&self, name: &str) -> Result<String> {
        let node = &self.nodes[self.lookup(name)?];
        if node.entry.is_dir() {
            return Err(VfsError::IsADirectory(name.to_string()));
        }
        Ok(match &node.content {
            Some(text) => text.clone(),
            None => format!(
                "[Binary file or content not available]\n\nFile: {}\nSize: {}\nPermissions: {}",
                node.entry.name,
                human_size(node.entry.size),
                node.entry.permissions
            ),
        })
    }

    /// Create an empty file or directory inside the directory at `dir`.
    pub fn create(
        &mut self,
        dir: &str,
        name: &str,
        kind: EntryKind,
        now: NaiveDateTime,
    ) -> Result<&FileEntry> {
        validate::file_name(name)?;
        let parent = self.dir_at(dir)?;
        if self.child(parent, name).is_some() {
            return Err(VfsError::AlreadyExists(name.to_string()));
        }
        let (size, permissions) = match kind {
            EntryKind::Directory => (4096, "drwxr-xr-x"),
            _ => (0, "-rw-r--r--"),
        };
        let entry = FileEntry {
            name: name.to_string(),
            path: String::new(),
            kind,
            size,
            permissions: permissions.into(),
            owner: "deploy".into(),
            group: "deploy".into(),
            modified: now,
        };
        let id = self.add_child(parent, entry, None);
        Ok(&self.nodes[id].entry)
    }

    /// Rename an entry of the directory at `dir`; descendants follow.
    pub fn rename(&mut self, dir: &str, from: &str, to: &str) -> Result<()> {
        validate::file_name(to)?;
        let parent = self.dir_at(dir)?;
        let id = self.lookup_in(parent, from)?;
        if from == to {
            return Ok(());
        }
        if self.child(parent, to).is_some() {
            return Err(VfsError::AlreadyExists(to.to_string()));
        }
        self.nodes[id].entry.name = to.to_string();
        self.repath(id);
        Ok(())
    }

    fn repath(&mut self, id: NodeId) {
        let parent_path = match self.nodes[id].parent {
            Some(p) => self.nodes[p].entry.path.clone(),
            None => return,
        };
        self.nodes[id].entry.path = join(&parent_path, &self.nodes[id].entry.name);
        for child in self.nodes[id].children.clone() {
            self.repath(child);
        }
    }

    /// Unlink an entry (and everything beneath it) from the directory at `dir`.
    pub fn remove(&mut self, dir: &str, name: &str) -> Result<FileEntry> {
        let parent = self.dir_at(dir)?;
        let id = self.lookup_in(parent, name)?;
        self.nodes[parent].children.retain(|&c| c != id);
        self.nodes[id].parent = None;
        Ok(self.nodes[id].entry.clone())
    }

    /// Apply an octal mode; returns the mode zero-padded to four digits.
    pub fn chmod(&mut self, dir: &str, name: &str, mode: &str) -> Result<String> {
        let padded = validate::permissions(mode)?;
        let id = self.lookup_in(self.dir_at(dir)?, name)?;
        let entry = &mut self.nodes[id].entry;
        entry.permissions = symbolic(entry.kind, &padded);
        Ok(padded)
    }

    /// The mock host's file tree.
    pub fn seeded() -> Self {
        let mut fs = Self::new();
        for (dir, name, kind, size, perms, owner, group, modified) in SEED {
            let Some(parent) = fs.resolve(dir) else {
                continue;
            };
            let path = join(dir, name);
            let content = CONTENTS
                .iter()
                .find(|(p, _)| *p == path)
                .map(|(_, text)| text.to_string());
            let entry = FileEntry {
                name: name.to_string(),
                path,
                kind: *kind,
                size: *size,
                permissions: perms.to_string(),
                owner: owner.to_string(),
                group: group.to_string(),
                modified: at(modified),
            };
            fs.add_child(parent, entry, content);
        }
        fs
    }
}

impl Default for Vfs {
    fn default() -> Self {
        Self::seeded()
    }
}

fn join(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// `drwxr-xr-x` style string from a kind and a four-digit octal mode.
/// Special bits (the leading digit) are not rendered.
fn symbolic(kind: EntryKind, mode: &str) -> String {
    let mut out = String::with_capacity(10);
    out.push(match kind {
        EntryKind::Directory => 'd',
        EntryKind::File => '-',
    });
    for digit in mode.bytes().skip(mode.len().saturating_sub(3)) {
        let bits = digit.saturating_sub(b'0');
        out.push(if bits & 4 != 0 { 'r' } else { '-' });
        out.push(if bits & 2 != 0 { 'w' } else { '-' });
        out.push(if bits & 1 != 0 { 'x' } else { '-' });
    }
    out
}

type SeedRow = (
    &'static str,
    &'static str,
    EntryKind,
    u64,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

const D: EntryKind = EntryKind::Directory;
const F: EntryKind = EntryKind::File;

// Parents are listed before their children.
const SEED: &[SeedRow] = &[
    ("/", "home", D, 4096, "drwxr-xr-x", "root", "root", "2024-01-15 10:00:00"),
    ("/", "var", D, 4096, "drwxr-xr-x", "root", "root", "2024-01-15 10:00:00"),
    ("/", "etc", D, 4096, "drwxr-xr-x", "root", "root", "2024-01-15 10:00:00"),
    ("/", "usr", D, 4096, "drwxr-xr-x", "root", "root", "2024-01-15 10:00:00"),
    ("/", "tmp", D, 4096, "drwxrwxrwt", "root", "root", "2024-01-20 15:30:00"),
    ("/home", "deploy", D, 4096, "drwxr-xr-x", "deploy", "deploy", "2024-01-20 14:00:00"),
    ("/home", "admin", D, 4096, "drwxr-xr-x", "admin", "admin", "2024-01-18 09:00:00"),
    ("/home/deploy", "app", D, 4096, "drwxr-xr-x", "deploy", "deploy", "2024-01-20 14:00:00"),
    ("/home/deploy", ".bashrc", F, 3526, "-rw-r--r--", "deploy", "deploy", "2024-01-15 10:00:00"),
    ("/home/deploy", ".profile", F, 807, "-rw-r--r--", "deploy", "deploy", "2024-01-15 10:00:00"),
    ("/home/deploy/app", "server.js", F, 15420, "-rw-r--r--", "deploy", "deploy", "2024-01-20 14:00:00"),
    ("/home/deploy/app", "package.json", F, 1245, "-rw-r--r--", "deploy", "deploy", "2024-01-20 14:00:00"),
    ("/home/deploy/app", "node_modules", D, 4096, "drwxr-xr-x", "deploy", "deploy", "2024-01-20 14:00:00"),
    ("/home/deploy/app", "public", D, 4096, "drwxr-xr-x", "deploy", "deploy", "2024-01-20 14:00:00"),
    ("/home/deploy/app", ".env", F, 256, "-rw-------", "deploy", "deploy", "2024-01-20 14:00:00"),
    ("/var", "www", D, 4096, "drwxr-xr-x", "root", "root", "2024-01-15 10:00:00"),
    ("/var", "log", D, 4096, "drwxr-xr-x", "root", "syslog", "2024-01-20 15:00:00"),
    ("/var", "lib", D, 4096, "drwxr-xr-x", "root", "root", "2024-01-15 10:00:00"),
    ("/var/www", "html", D, 4096, "drwxr-xr-x", "www-data", "www-data", "2024-01-15 10:00:00"),
    ("/var/www/html", "index.html", F, 10918, "-rw-r--r--", "www-data", "www-data", "2024-01-15 10:00:00"),
    ("/var/www/html", "styles.css", F, 4521, "-rw-r--r--", "www-data", "www-data", "2024-01-15 10:00:00"),
    ("/var/www/html", "script.js", F, 8734, "-rw-r--r--", "www-data", "www-data", "2024-01-15 10:00:00"),
    ("/var/www/html", "images", D, 4096, "drwxr-xr-x", "www-data", "www-data", "2024-01-15 10:00:00"),
    ("/etc", "nginx", D, 4096, "drwxr-xr-x", "root", "root", "2024-01-15 10:30:00"),
    ("/etc", "ssh", D, 4096, "drwxr-xr-x", "root", "root", "2024-01-15 10:00:00"),
    ("/etc", "passwd", F, 2458, "-rw-r--r--", "root", "root", "2024-01-18 10:00:00"),
    ("/etc", "shadow", F, 1234, "-rw-r-----", "root", "shadow", "2024-01-18 10:00:00"),
    ("/etc", "hosts", F, 256, "-rw-r--r--", "root", "root", "2024-01-15 10:00:00"),
];

const CONTENTS: &[(&str, &str)] = &[
    (
        "/home/deploy/.bashrc",
        "# ~/.bashrc: executed by bash(1) for non-login shells.

# If not running interactively, don't do anything
case $- in
    *i*) ;;
      *) return;;
esac

# don't put duplicate lines or lines starting with space in the history.
HISTCONTROL=ignoreboth

# append to the history file, don't overwrite it
shopt -s histappend

# for setting history length see HISTSIZE and HISTFILESIZE in bash(1)
HISTSIZE=1000
HISTFILESIZE=2000
",
    ),
    (
        "/var/www/html/index.html",
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Welcome to srvdash</title>
    <link rel="stylesheet" href="styles.css">
</head>
<body>
    <div class="container">
        <h1>Welcome to srvdash</h1>
        <p>Your server is running successfully!</p>
    </div>
    <script src="script.js"></script>
</body>
</html>
"#,
    ),
    (
        "/etc/hosts",
        "127.0.0.1   localhost
127.0.1.1   srvdash-host

# The following lines are desirable for IPv6 capable hosts
::1     ip6-localhost ip6-loopback
fe00::0 ip6-localnet
ff00::0 ip6-mcastprefix
ff02::1 ip6-allnodes
ff02::2 ip6-allrouters
",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn names(fs: &Vfs) -> Vec<&str> {
        fs.list().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn seeded_root_listing() {
        let fs = Vfs::seeded();
        assert_eq!(fs.cwd(), "/");
        assert_eq!(names(&fs), ["home", "var", "etc", "usr", "tmp"]);
        assert_eq!(fs.breadcrumb(), ["/"]);
    }

    #[test]
    fn navigate_down_and_up() {
        let mut fs = Vfs::seeded();
        fs.enter("home").unwrap();
        fs.enter("deploy").unwrap();
        assert_eq!(fs.cwd(), "/home/deploy");
        assert_eq!(fs.breadcrumb(), ["/", "home", "deploy"]);
        assert_eq!(
            fs.enter(".bashrc"),
            Err(VfsError::NotADirectory(".bashrc".into()))
        );
        assert!(fs.up());
        assert!(fs.up());
        assert!(!fs.up());
        assert_eq!(fs.cwd(), "/");
    }

    #[test]
    fn reading_known_and_unknown_files() {
        let mut fs = Vfs::seeded();
        fs.cd("/etc").unwrap();
        assert!(fs.read("hosts").unwrap().starts_with("127.0.0.1"));
        let summary = fs.read("passwd").unwrap();
        assert!(summary.starts_with("[Binary file or content not available]"));
        assert!(summary.contains("Size: 2.4 KB"));
        assert!(matches!(fs.read("ssh"), Err(VfsError::IsADirectory(_))));
        assert!(matches!(fs.read("nope"), Err(VfsError::NotFound(_))));
    }

    #[test]
    fn create_rejects_duplicates_and_bad_names() {
        let mut fs = Vfs::seeded();
        fs.cd("/tmp").unwrap();
        let now = at("2024-02-01 12:00:00");
        let made = fs.create("/tmp", "scratch", EntryKind::Directory, now).unwrap();
        assert_eq!(made.path, "/tmp/scratch");
        assert_eq!(made.size, 4096);
        assert_eq!(made.permissions, "drwxr-xr-x");
        assert_eq!(made.owner, "deploy");
        let file = fs.create("/tmp", "a.txt", EntryKind::File, now).unwrap();
        assert_eq!((file.size, file.permissions.as_str()), (0, "-rw-r--r--"));
        assert_eq!(
            fs.create("/tmp", "scratch", EntryKind::File, now).err(),
            Some(VfsError::AlreadyExists("scratch".into()))
        );
        assert_eq!(
            fs.create("/tmp", "a|b", EntryKind::File, now).err(),
            Some(VfsError::Invalid(ValidationError::BadFileName))
        );
        assert_eq!(
            fs.create("/etc/hosts", "x", EntryKind::File, now).err(),
            Some(VfsError::NotADirectory("/etc/hosts".into()))
        );
    }

    #[test]
    fn rename_directory_updates_descendant_paths() {
        let mut fs = Vfs::seeded();
        fs.cd("/home/deploy").unwrap();
        fs.rename("/home/deploy", "app", "site").unwrap();
        fs.enter("site").unwrap();
        let paths: Vec<&str> = fs.list().iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"/home/deploy/site/server.js"));
        assert!(fs.cd("/home/deploy/app").is_err());
        fs.up();
        assert!(matches!(
            fs.rename("/home/deploy", "site", ".bashrc"),
            Err(VfsError::AlreadyExists(_))
        ));
    }

    #[test]
    fn remove_unlinks_subtree() {
        let mut fs = Vfs::seeded();
        fs.cd("/var/www").unwrap();
        let gone = fs.remove("/var/www", "html").unwrap();
        assert_eq!(gone.path, "/var/www/html");
        assert!(fs.list().is_empty());
        assert!(fs.cd("/var/www/html").is_err());
    }

    #[test]
    fn edits_target_their_own_directory() {
        let mut fs = Vfs::seeded();
        fs.cd("/home").unwrap();
        let now = at("2024-02-01 12:00:00");
        fs.create("/home/deploy", "scratch", EntryKind::File, now).unwrap();
        assert_eq!(names(&fs), ["deploy", "admin"]);
        fs.remove("/home/deploy", "scratch").unwrap();
        assert_eq!(
            fs.remove("/home", "scratch"),
            Err(VfsError::NotFound("scratch".into()))
        );
        assert!(matches!(fs.create("/nope", "x", EntryKind::File, now), Err(VfsError::NotFound(_))));
    }

    #[test]
    fn chmod_pads_and_rewrites_mode() {
        let mut fs = Vfs::seeded();
        fs.cd("/home/deploy/app").unwrap();
        assert_eq!(fs.chmod("/home/deploy/app", ".env", "644").unwrap(), "0644");
        let env = fs.list().into_iter().find(|e| e.name == ".env").unwrap();
        assert_eq!(env.permissions, "-rw-r--r--");
        assert_eq!(fs.chmod("/home/deploy/app", "public", "0750").unwrap(), "0750");
        assert_eq!(
            fs.chmod("/home/deploy/app", ".env", "9"),
            Err(VfsError::Invalid(ValidationError::BadPermissions))
        );
    }
}
