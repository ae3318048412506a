/// 根节点的标签（界面上显示为 home 图标）
pub const ROOT_LABEL: &str = "home";

/// 面包屑中的一段。`target` 是点击后要加载的累积路径。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub target: String,
}

impl Crumb {
    pub fn is_root(&self) -> bool {
        self.target.is_empty()
    }
}

/// 根节点 + 每个 `/` 分段一项，目标依次为 `""`、`a`、`a/b`……
pub fn breadcrumbs(path: &str) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb {
        label: ROOT_LABEL.to_string(),
        target: String::new(),
    }];
    if path.is_empty() {
        return crumbs;
    }

    let mut current = String::new();
    for (index, part) in path.split('/').enumerate() {
        if index > 0 {
            current.push('/');
        }
        current.push_str(part);
        crumbs.push(Crumb {
            label: part.to_string(),
            target: current.clone(),
        });
    }
    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_path_yields_cumulative_targets() {
        let targets: Vec<_> = breadcrumbs("a/b/c").into_iter().map(|c| c.target).collect();
        assert_eq!(targets, ["", "a", "a/b", "a/b/c"]);
    }

    #[test]
    fn root_only_for_empty_path() {
        let crumbs = breadcrumbs("");
        assert_eq!(crumbs.len(), 1);
        assert!(crumbs[0].is_root());
        assert_eq!(crumbs[0].label, ROOT_LABEL);
    }

    #[test]
    fn labels_are_single_components() {
        let labels: Vec<_> = breadcrumbs("photos/2024").into_iter().map(|c| c.label).collect();
        assert_eq!(labels, [ROOT_LABEL, "photos", "2024"]);
    }
}
