use std::path::PathBuf;

/// Discover the top-level scan origins available to this machine.
///
/// Windows probes drive letters; everywhere else the mount table is
/// consulted, falling back to `/` when it cannot be read. Returned roots are
/// absolute and disjoint: a mount nested under another returned root is
/// dropped, since its subtree is already reachable from the outer root and
/// crawling it separately would index every entry twice.
pub fn enumerate_roots() -> Vec<PathBuf> {
    disjoint_roots(platform_roots())
}

/// Collapse a set of candidate roots to the outermost disjoint ones,
/// dropping duplicates and any root nested under another. Crawling the
/// result indexes each reachable entry exactly once.
pub fn disjoint_roots(mut roots: Vec<PathBuf>) -> Vec<PathBuf> {
    roots.sort_by_key(|root| root.components().count());
    let mut kept: Vec<PathBuf> = Vec::with_capacity(roots.len());
    for root in roots {
        if !kept.iter().any(|outer| root.starts_with(outer)) {
            kept.push(root);
        }
    }
    kept
}

#[cfg(windows)]
fn platform_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for letter in 'A'..='Z' {
        let drive = PathBuf::from(format!("{letter}:\\"));
        if std::fs::metadata(&drive).is_ok() {
            roots.push(drive);
        }
    }
    roots
}

#[cfg(not(windows))]
fn platform_roots() -> Vec<PathBuf> {
    match std::fs::read_to_string("/proc/mounts") {
        Ok(table) => {
            let mut roots = mounted_roots(&table);
            if roots.is_empty() {
                roots.push(PathBuf::from("/"));
            }
            roots
        }
        Err(_) => fallback_roots(),
    }
}

/// Parse a `/proc/mounts`-style table, keeping mounts backed by a real
/// device (the source field is an absolute path). Pseudo-filesystems like
/// proc, sysfs and tmpfs name their source without a leading slash and are
/// dropped.
#[cfg(not(windows))]
fn mounted_roots(table: &str) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for line in table.lines() {
        let mut fields = line.split_whitespace();
        let Some(source) = fields.next() else {
            continue;
        };
        let Some(target) = fields.next() else {
            continue;
        };
        if !source.starts_with('/') {
            continue;
        }
        // Octal escapes per fstab(5): the only one that matters for mount
        // points in practice is the space.
        let target = target.replace("\\040", " ");
        let path = PathBuf::from(target);
        if !roots.contains(&path) {
            roots.push(path);
        }
    }
    roots
}

/// No readable mount table (macOS and friends): scan `/` and any mounted
/// volumes.
#[cfg(not(windows))]
fn fallback_roots() -> Vec<PathBuf> {
    let mut roots = vec![PathBuf::from("/")];
    if let Ok(entries) = std::fs::read_dir("/Volumes") {
        for entry in entries.flatten() {
            roots.push(entry.path());
        }
    }
    roots
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn keeps_device_backed_mounts_only() {
        let table = "\
/dev/sda1 / ext4 rw,relatime 0 0
proc /proc proc rw,nosuid 0 0
sysfs /sys sysfs rw,nosuid 0 0
tmpfs /run tmpfs rw,nosuid 0 0
/dev/sdb1 /mnt/data ext4 rw,relatime 0 0
";
        let roots = mounted_roots(table);
        assert_eq!(roots, vec![PathBuf::from("/"), PathBuf::from("/mnt/data")]);
    }

    #[test]
    fn deduplicates_repeated_targets() {
        let table = "\
/dev/sda1 / ext4 rw 0 0
/dev/sda1 / ext4 ro 0 0
";
        assert_eq!(mounted_roots(table), vec![PathBuf::from("/")]);
    }

    #[test]
    fn unescapes_spaces_in_mount_points() {
        let table = "/dev/sdc1 /mnt/usb\\040drive vfat rw 0 0\n";
        assert_eq!(mounted_roots(table), vec![PathBuf::from("/mnt/usb drive")]);
    }

    #[test]
    fn nested_roots_collapse_to_the_outermost() {
        let roots = disjoint_roots(vec![
            PathBuf::from("/mnt/data/deep"),
            PathBuf::from("/mnt/data"),
            PathBuf::from("/srv"),
            PathBuf::from("/srv"),
        ]);
        assert_eq!(roots, vec![PathBuf::from("/srv"), PathBuf::from("/mnt/data")]);
    }

    #[test]
    fn enumerated_mounts_nested_under_slash_are_dropped() {
        let table = "\
/dev/sda1 / ext4 rw 0 0
/dev/sdb1 /mnt/data ext4 rw 0 0
";
        assert_eq!(disjoint_roots(mounted_roots(table)), vec![PathBuf::from("/")]);
    }

    #[test]
    fn enumeration_yields_absolute_roots() {
        for root in enumerate_roots() {
            assert!(root.is_absolute(), "{root:?} is not absolute");
        }
    }
}
