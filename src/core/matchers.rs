use crate::core::dataset::ReferenceDataset;
use crate::core::text::{normalize, strip_www};
use crate::domain::model::Category;
use std::collections::HashSet;

/// "Is this source a known X site" predicates, derived once from a dataset.
#[derive(Debug, Clone, Default)]
pub struct CategoryMatchers {
    search: HashSet<String>,
    social: HashSet<String>,
    shopping: HashSet<String>,
    video: HashSet<String>,
}

impl CategoryMatchers {
    pub fn from_dataset(dataset: &ReferenceDataset) -> Self {
        let mut matchers = Self::default();
        for (key, category) in dataset.entries() {
            matchers.set_mut(category).insert(key.to_string());
        }
        matchers
    }

    fn set(&self, category: Category) -> &HashSet<String> {
        match category {
            Category::Search => &self.search,
            Category::Social => &self.social,
            Category::Shopping => &self.shopping,
            Category::Video => &self.video,
        }
    }

    fn set_mut(&mut self, category: Category) -> &mut HashSet<String> {
        match category {
            Category::Search => &mut self.search,
            Category::Social => &mut self.social,
            Category::Shopping => &mut self.shopping,
            Category::Video => &mut self.video,
        }
    }

    pub fn is_known(&self, category: Category, source: &str) -> bool {
        let set = self.set(category);
        if set.is_empty() {
            return false;
        }
        let source = normalize(source);
        if source.is_empty() {
            return false;
        }
        set.contains(strip_www(&source)) || set.contains(source.as_str())
    }

    pub fn is_known_search_site(&self, source: &str) -> bool {
        self.is_known(Category::Search, source)
    }

    pub fn is_known_shopping_site(&self, source: &str) -> bool {
        self.is_known(Category::Shopping, source)
    }

    pub fn is_known_social_site(&self, source: &str) -> bool {
        self.is_known(Category::Social, source)
    }

    pub fn is_known_video_site(&self, source: &str) -> bool {
        self.is_known(Category::Video, source)
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.into_iter().all(|c| self.set(c).is_empty())
    }
}
