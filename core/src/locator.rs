use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::VerifyError;

pub const PAGE_EXTENSION: &str = ".html";

fn storyboard_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[(\d+-\d+(?:-\d+)?(?:-\d+)?)").expect("storyboard id pattern")
    })
}

/// `[6-1-1 캐릭터 등록>기본 정보]` -> `6-1-1`. 식별자가 없으면 섹션 헤더 행이다.
pub fn resolve_id(raw: &str) -> Option<String> {
    storyboard_pattern()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageArtifact {
    pub file_name: String,
    pub path: PathBuf,
}

/// 페이지 디렉터리의 파일 목록. 실행 동안 페이지 파일은 바뀌지 않는다고 본다.
#[derive(Clone, Debug)]
pub struct PageDir {
    root: PathBuf,
    pages: Vec<String>,
}

impl PageDir {
    pub fn open(root: &Path) -> Result<Self, VerifyError> {
        let unreadable = |e: std::io::Error| VerifyError::PageDirUnreadable {
            path: root.display().to_string(),
            message: e.to_string(),
        };
        let mut pages = Vec::new();
        for entry in fs::read_dir(root).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.ends_with(PAGE_EXTENSION) {
                pages.push(name);
            }
        }
        // 목록 순서를 고정해 같은 입력이면 같은 파일이 선택되게 한다.
        pages.sort();
        Ok(Self {
            root: root.to_path_buf(),
            pages,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn page_names(&self) -> &[String] {
        &self.pages
    }

    /// 파일명 첫 토큰(공백 앞)이 `id`와 정확히 같은 첫 페이지.
    pub fn locate(&self, id: &str) -> Option<PageArtifact> {
        self.pages
            .iter()
            .find(|name| name.split(' ').next() == Some(id))
            .map(|name| PageArtifact {
                file_name: name.clone(),
                path: self.root.join(name),
            })
    }

    /// 페이지 안의 상대 링크가 가리키는 파일이 있는지.
    pub fn link_target_exists(&self, href: &str) -> bool {
        let decoded = url::Url::from_directory_path(&self.root)
            .ok()
            .and_then(|base| base.join(href).ok())
            .and_then(|target| target.to_file_path().ok());
        match decoded {
            Some(path) => path.exists() || self.root.join(href).exists(),
            None => self.root.join(href).exists(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "<html></html>").expect("write page");
    }

    #[test]
    fn resolve_id_reads_bracketed_prefix() {
        assert_eq!(resolve_id("[6-1-1 캐릭터 등록>기본 정보]").as_deref(), Some("6-1-1"));
        assert_eq!(resolve_id("[2-3 브랜드]").as_deref(), Some("2-3"));
        assert_eq!(resolve_id("[1-2-3-4-5 깊은 단계]").as_deref(), Some("1-2-3-4"));
        assert_eq!(resolve_id("6-1-1 괄호 없음"), None);
        assert_eq!(resolve_id("[크리에이터 섹션]"), None);
        assert_eq!(resolve_id(""), None);
    }

    #[test]
    fn locate_requires_exact_leading_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "6-1-1 캐릭터 등록_기본 정보.html");
        touch(dir.path(), "6-1-10 캐릭터 목록.html");
        touch(dir.path(), "6-1 캐릭터.txt");
        let pages = PageDir::open(dir.path()).expect("open");

        let found = pages.locate("6-1-1").expect("6-1-1 located");
        assert_eq!(found.file_name, "6-1-1 캐릭터 등록_기본 정보.html");
        assert_eq!(found.path, dir.path().join("6-1-1 캐릭터 등록_기본 정보.html"));
        assert!(pages.locate("6-1").is_none());
        assert!(pages.locate("6-1-1 ").is_none());
        assert!(pages.locate("6-1-10").is_some());
    }

    #[test]
    fn unreadable_directory_is_fatal() {
        let err = PageDir::open(Path::new("/nonexistent/pages")).expect_err("missing dir");
        assert_eq!(err.code(), "E_PAGE_DIR_UNREADABLE");
    }

    #[test]
    fn link_targets_accept_encoded_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "1-1 홈.html");
        let pages = PageDir::open(dir.path()).expect("open");
        assert!(pages.link_target_exists("1-1 홈.html"));
        assert!(pages.link_target_exists("1-1%20%ED%99%88.html"));
        assert!(!pages.link_target_exists("missing-page.html"));
    }
}
