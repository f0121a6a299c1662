//! Built-in build matrix tables

use crate::matrix::{BranchEntry, PlatformEntry};
use std::collections::BTreeMap;

/// Directory the host server tree is cloned into. CPack truncates paths
/// relative to a short build root, so this must stay long.
pub const BUILD_DIR: &str = "verylongdirnameforverystrangecpackbehavior";
/// Clone depth for the plugin repository
pub const CLONE_DEPTH: u32 = 10;
/// Image for the git-only steps
pub const GIT_IMAGE: &str = "alpine/git";
/// Shared volume name
pub const VOLUME: &str = "mdb";
/// Shared volume mount point
pub const MOUNT_PATH: &str = "/mdb";
/// Drone workspace holding this repository
pub const SOURCE_DIR: &str = "/drone/src";
/// Plugin location inside the server tree
pub const PLUGIN_PATH: &str = "storage/columnstore";
/// Secret holding the GitHub token for private clones
pub const TOKEN_SECRET: &str = "github_token";
/// Variable the GitHub token is exposed as
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Server feature flags shared by every platform
pub const CMAKE_FLAGS: &str = "-DPLUGIN_COLUMNSTORE=YES -DPLUGIN_MROONGA=NO -DPLUGIN_ROCKSDB=NO \
-DPLUGIN_TOKUDB=NO -DPLUGIN_CONNECT=NO -DPLUGIN_SPIDER=NO -DPLUGIN_OQGRAPH=NO \
-DPLUGIN_PERFSCHEMA=NO -DPLUGIN_SPHINX=NO -DWITH_WSREP=OFF -DCMAKE_BUILD_TYPE=RelWithDebInfo";

const RPM_DEPS: &str = "git cmake3 make gcc gcc-c++ libaio-devel openssl-devel boost-devel bison \
snappy-devel flex libcurl-devel libxml2-devel ncurses-devel automake libtool \
policycoreutils-devel rpm-build lsof iproute pam-devel perl-DBI cracklib-devel expect \
readline-devel";

const DEB_DEPS: &str = "devscripts equivs git libdistro-info-perl lsb-release \
libsnappy-dev libcurl4-openssl-dev";

const MK_BUILD_DEPS: &str = "mk-build-deps debian/control \
-t 'apt-get -y -o Debug::pkgProblemResolver=yes --no-install-recommends' -r -i";

/// Built-in branch mapping and targets
#[must_use]
pub fn branches() -> BTreeMap<String, BranchEntry> {
    BTreeMap::from([
        (
            "develop".to_string(),
            branch(
                "git clone --recurse-submodules --branch 10.5 --depth 1 \
                 https://github.com/MariaDB/server .",
                &["centos:8", "debian:10", "ubuntu:18.04", "ubuntu:20.04"],
            ),
        ),
        (
            "develop-1.4".to_string(),
            branch(
                "git clone --recurse-submodules --branch 10.4.12-6 --depth 1 \
                 https://$${GITHUB_TOKEN}@github.com/mariadb-corporation/MariaDBEnterprise .",
                &["centos:7", "debian:9", "ubuntu:16.04"],
            ),
        ),
    ])
}

/// Built-in platform mapping
#[must_use]
pub fn platforms() -> BTreeMap<String, PlatformEntry> {
    BTreeMap::from([
        (
            "centos:7".to_string(),
            rpm(
                &format!(
                    "yum -y install epel-release && yum -y install {RPM_DEPS} \
                     && ln -sf /usr/bin/cmake3 /usr/local/bin/cmake"
                ),
                "centos7",
            ),
        ),
        (
            "centos:8".to_string(),
            rpm(
                &format!(
                    "yum -y install epel-release dnf-plugins-core \
                     && yum config-manager --set-enabled PowerTools \
                     && yum -y install {} cmake",
                    RPM_DEPS.replacen("cmake3 ", "", 1)
                ),
                "centos8",
            ),
        ),
        ("debian:9".to_string(), deb("stretch")),
        ("debian:10".to_string(), deb("buster")),
        ("ubuntu:16.04".to_string(), deb("xenial")),
        ("ubuntu:18.04".to_string(), deb("bionic")),
        ("ubuntu:20.04".to_string(), deb("focal")),
    ])
}

fn branch(checkout: &str, platforms: &[&str]) -> BranchEntry {
    BranchEntry {
        checkout: checkout.to_string(),
        platforms: platforms.iter().map(|p| (*p).to_string()).collect(),
    }
}

fn rpm(install: &str, dist: &str) -> PlatformEntry {
    PlatformEntry {
        build: format!("{install} && cmake {CMAKE_FLAGS} -DRPM={dist} && make -j$(nproc) package"),
        artifacts: Some("*.rpm".to_string()),
        env: BTreeMap::new(),
    }
}

fn deb(codename: &str) -> PlatformEntry {
    PlatformEntry {
        build: format!(
            "apt-get update && apt-get install -y --no-install-recommends {DEB_DEPS} \
             && {MK_BUILD_DEPS} \
             && CMAKEFLAGS='{CMAKE_FLAGS} -DDEB={codename}' debian/autobake-deb.sh"
        ),
        artifacts: Some("../*.deb".to_string()),
        env: BTreeMap::from([
            ("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string()),
            ("DEB_BUILD_OPTIONS".to_string(), "parallel=4".to_string()),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_platform_enables_the_plugin() {
        for (name, entry) in platforms() {
            assert!(
                entry.build.contains("-DPLUGIN_COLUMNSTORE=YES"),
                "{name} does not enable the plugin"
            );
            assert!(entry.artifacts.is_some(), "{name} has no artifact glob");
        }
    }

    #[test]
    fn test_rpm_platforms_invoke_cmake_directly() {
        let platforms = platforms();
        assert!(platforms["centos:7"].build.contains("cmake -DPLUGIN_COLUMNSTORE=YES"));
        assert!(platforms["centos:7"].build.contains("-DRPM=centos7"));
        assert!(platforms["centos:8"].build.contains("-DRPM=centos8"));
        assert!(!platforms["centos:8"].build.contains("cmake3"));
    }

    #[test]
    fn test_deb_platforms_use_autobake() {
        let debian = &platforms()["debian:9"];
        assert!(debian.build.ends_with("-DDEB=stretch' debian/autobake-deb.sh"));
        assert_eq!(debian.env["DEBIAN_FRONTEND"], "noninteractive");
    }

    #[test]
    fn test_enterprise_branch_pins_tag() {
        let branches = branches();
        assert!(branches["develop-1.4"].checkout.contains("--branch 10.4.12-6"));
        assert!(branches["develop"].checkout.contains("MariaDB/server"));
    }
}
