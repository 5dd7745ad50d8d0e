//! Profile match filtering.
//!
//! A pure predicate plus sort over an already fetched candidate set. Nothing
//! here talks to the database; `route::profile` pre-filters in SQL by gender
//! and owner, then hands the rows to [`filter_profiles`].

use std::{fmt, str::FromStr};

use crate::model::profile::Profile;

pub const DEFAULT_MIN_AGE: i32 = 18;
pub const DEFAULT_MAX_AGE: i32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// Gender shown to a viewer of this gender. `Other` sees everyone.
    pub fn opposite(&self) -> Option<Gender> {
        match self {
            Gender::Male => Some(Gender::Female),
            Gender::Female => Some(Gender::Male),
            Gender::Other => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(anyhow::anyhow!("unknown gender {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    /// keep input order
    #[default]
    Relevance,
    Newest,
    AgeAsc,
    AgeDesc,
}

impl FromStr for SortBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevance" => Ok(SortBy::Relevance),
            "newest" => Ok(SortBy::Newest),
            "age_asc" => Ok(SortBy::AgeAsc),
            "age_desc" => Ok(SortBy::AgeDesc),
            other => Err(anyhow::anyhow!("unknown sort {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchFilters {
    pub religion: Option<String>,
    pub caste: Option<String>,
    pub sub_caste: Option<String>,
    pub mother_tongue: Option<String>,
    pub marital_status: Option<String>,
    pub min_age: i32,
    pub max_age: i32,
    pub search: Option<String>,
}

impl Default for MatchFilters {
    fn default() -> Self {
        Self {
            religion: None,
            caste: None,
            sub_caste: None,
            mother_tongue: None,
            marital_status: None,
            min_age: DEFAULT_MIN_AGE,
            max_age: DEFAULT_MAX_AGE,
            search: None,
        }
    }
}

fn equals_filter(filter: &Option<String>, value: &Option<String>) -> bool {
    match filter {
        Some(filter) => value.as_deref() == Some(filter.as_str()),
        None => true,
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|x| x.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

fn substring_filter(filter: &Option<String>, value: &Option<String>) -> bool {
    match filter {
        Some(filter) => contains_ignore_case(value.as_deref(), filter),
        None => true,
    }
}

/// Whether `profile` passes every active filter for a viewer of
/// `viewer_gender`.
pub fn matches(profile: &Profile, viewer_gender: Option<Gender>, filters: &MatchFilters) -> bool {
    let matches_gender = match viewer_gender.and_then(|x| x.opposite()) {
        Some(wanted) => profile
            .gender
            .parse::<Gender>()
            .map(|x| x == wanted)
            .unwrap_or(false),
        None => true,
    };
    let matches_search = match &filters.search {
        Some(search) => {
            contains_ignore_case(Some(&profile.name), search)
                || contains_ignore_case(profile.profession.as_deref(), search)
        }
        None => true,
    };

    matches_gender
        && equals_filter(&filters.religion, &profile.religion)
        && substring_filter(&filters.caste, &profile.caste)
        && substring_filter(&filters.sub_caste, &profile.sub_caste)
        && equals_filter(&filters.mother_tongue, &profile.mother_tongue)
        && equals_filter(&filters.marital_status, &profile.marital_status)
        && profile.age >= filters.min_age
        && profile.age <= filters.max_age
        && matches_search
}

pub fn filter_profiles(
    profiles: Vec<Profile>,
    viewer_gender: Option<Gender>,
    filters: &MatchFilters,
    sort_by: SortBy,
) -> Vec<Profile> {
    let mut result: Vec<Profile> = profiles
        .into_iter()
        .filter(|x| matches(x, viewer_gender, filters))
        .collect();
    // sort_by is stable, equal keys keep their input order
    match sort_by {
        SortBy::Relevance => {}
        SortBy::Newest => result.sort_by(|a, b| b.id.cmp(&a.id)),
        SortBy::AgeAsc => result.sort_by(|a, b| a.age.cmp(&b.age)),
        SortBy::AgeDesc => result.sort_by(|a, b| b.age.cmp(&a.age)),
    }
    result
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn profile(name: &str, gender: &str, age: i32) -> Profile {
        Profile {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            email: None,
            name: name.to_string(),
            age,
            dob: None,
            birth_time: None,
            gender: gender.to_string(),
            religion: Some("Hindu".to_string()),
            caste: Some("Brahmin".to_string()),
            sub_caste: Some("Kanyakubja".to_string()),
            mother_tongue: Some("Hindi".to_string()),
            profession: Some("Software Engineer".to_string()),
            location: Some("Mumbai".to_string()),
            education: None,
            height: None,
            income: None,
            marital_status: Some("Never Married".to_string()),
            bio: None,
            hobbies: vec![],
            image_url: None,
            gallery: vec![],
            traits: None,
            partner_pref: None,
            father_occupation: None,
            mother_occupation: None,
            siblings: None,
            family_location: None,
            family_status: None,
            verified: false,
            created_date: None,
            updated_date: None,
        }
    }

    fn names(profiles: &[Profile]) -> Vec<&str> {
        profiles.iter().map(|x| x.name.as_str()).collect()
    }

    #[test]
    fn test_gender_parse_is_case_insensitive() {
        assert_eq!("MALE".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(" female".parse::<Gender>().unwrap(), Gender::Female);
        assert!("unknown".parse::<Gender>().is_err());
    }

    #[test]
    fn test_gender_filter_is_symmetric() {
        let candidates = vec![
            profile("asha", "Female", 25),
            profile("ravi", "Male", 27),
            profile("sam", "Other", 30),
        ];
        let filters = MatchFilters::default();

        let for_male = filter_profiles(
            candidates.clone(),
            Some(Gender::Male),
            &filters,
            SortBy::Relevance,
        );
        assert_eq!(names(&for_male), vec!["asha"]);

        let for_female = filter_profiles(
            candidates.clone(),
            Some(Gender::Female),
            &filters,
            SortBy::Relevance,
        );
        assert_eq!(names(&for_female), vec!["ravi"]);

        let for_other = filter_profiles(candidates, Some(Gender::Other), &filters, SortBy::Relevance);
        assert_eq!(for_other.len(), 3);
    }

    #[test]
    fn test_gender_filter_is_idempotent() {
        let candidates = vec![
            profile("asha", "Female", 25),
            profile("ravi", "Male", 27),
            profile("meera", "female", 29),
        ];
        let filters = MatchFilters::default();
        let once = filter_profiles(candidates, Some(Gender::Male), &filters, SortBy::Relevance);
        let twice = filter_profiles(once.clone(), Some(Gender::Male), &filters, SortBy::Relevance);
        assert_eq!(once, twice);
        assert_eq!(names(&once), vec!["asha", "meera"]);
    }

    #[test]
    fn test_age_range_is_inclusive() {
        let candidates = vec![
            profile("too_young", "Female", 24),
            profile("lower", "Female", 25),
            profile("middle", "Female", 28),
            profile("upper", "Female", 30),
            profile("too_old", "Female", 31),
        ];
        let filters = MatchFilters {
            min_age: 25,
            max_age: 30,
            ..Default::default()
        };
        let result = filter_profiles(candidates, None, &filters, SortBy::Relevance);
        assert_eq!(names(&result), vec!["lower", "middle", "upper"]);
    }

    #[test]
    fn test_exact_and_substring_filters() {
        let mut christian = profile("sarah", "Female", 26);
        christian.religion = Some("Christian".to_string());
        christian.caste = None;
        let mut tamil = profile("priya", "Female", 26);
        tamil.mother_tongue = Some("Tamil".to_string());
        let hindi = profile("anita", "Female", 26);
        let candidates = vec![christian, tamil, hindi];

        let filters = MatchFilters {
            religion: Some("Hindu".to_string()),
            ..Default::default()
        };
        let result = filter_profiles(candidates.clone(), None, &filters, SortBy::Relevance);
        assert_eq!(names(&result), vec!["priya", "anita"]);

        let filters = MatchFilters {
            caste: Some("brah".to_string()),
            sub_caste: Some("KANYA".to_string()),
            mother_tongue: Some("Hindi".to_string()),
            ..Default::default()
        };
        let result = filter_profiles(candidates.clone(), None, &filters, SortBy::Relevance);
        assert_eq!(names(&result), vec!["anita"]);

        let filters = MatchFilters {
            marital_status: Some("Divorced".to_string()),
            ..Default::default()
        };
        assert!(filter_profiles(candidates, None, &filters, SortBy::Relevance).is_empty());
    }

    #[test]
    fn test_search_over_name_and_profession() {
        let mut doctor = profile("kavya", "Female", 26);
        doctor.profession = Some("Doctor".to_string());
        let mut no_profession = profile("divya", "Female", 26);
        no_profession.profession = None;
        let candidates = vec![doctor, no_profession, profile("docia", "Female", 26)];

        let filters = MatchFilters {
            search: Some("doc".to_string()),
            ..Default::default()
        };
        let result = filter_profiles(candidates, None, &filters, SortBy::Relevance);
        assert_eq!(names(&result), vec!["kavya", "docia"]);
    }

    #[test]
    fn test_sorting() {
        let first = profile("first", "Female", 30);
        let second = profile("second", "Female", 22);
        let third = profile("third", "Female", 30);
        let candidates = vec![first, second, third];
        let filters = MatchFilters::default();

        let relevance = filter_profiles(candidates.clone(), None, &filters, SortBy::Relevance);
        assert_eq!(names(&relevance), vec!["first", "second", "third"]);

        let newest = filter_profiles(candidates.clone(), None, &filters, SortBy::Newest);
        assert_eq!(names(&newest), vec!["third", "second", "first"]);

        let age_asc = filter_profiles(candidates.clone(), None, &filters, SortBy::AgeAsc);
        assert_eq!(names(&age_asc), vec!["second", "first", "third"]);

        let age_desc = filter_profiles(candidates, None, &filters, SortBy::AgeDesc);
        assert_eq!(names(&age_desc), vec!["first", "third", "second"]);
    }

    #[test]
    fn test_sort_by_parse() {
        assert_eq!("age_desc".parse::<SortBy>().unwrap(), SortBy::AgeDesc);
        assert!("score".parse::<SortBy>().is_err());
    }
}
