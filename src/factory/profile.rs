use chrono::{Datelike, Local, NaiveDate};
use fake::{
    faker::{
        address::en::CityName,
        job::en::Title,
        lorem::en::{Sentence, Words},
        name::en::Name,
    },
    Dummy, Fake, Faker,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{model::profile::Profile, repository::profile::create_profile};

const GENDERS: [&str; 2] = ["Male", "Female"];
const RELIGIONS: [&str; 4] = ["Hindu", "Muslim", "Christian", "Sikh"];
const MOTHER_TONGUES: [&str; 4] = ["Hindi", "Tamil", "Telugu", "Marathi"];

/// Profiles reference an existing user, so modifiers are expected to set
/// `user_id` from `ext`.
pub struct ProfileFactory<T: Clone> {
    modifier_one: fn(x: &Profile, ext: T) -> Profile,
    modifier_many: fn(x: &Profile, idx: usize, ext: T) -> Profile,
}

impl<T: Clone> Default for ProfileFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ProfileFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Profile, ext: T) -> Profile) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Profile, idx: usize, ext: T) -> Profile) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Profile> {
        let data = ProfileDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        let mut tx = db.begin().await?;
        create_profile(&mut tx, &data).await?;
        tx.commit().await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<Profile>> {
        let data = ProfileDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Profile> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            create_profile(&mut tx, item).await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[derive(Debug, Dummy, Clone)]
struct ProfileDummy {
    #[dummy(faker = "Name()")]
    pub name: String,
    #[dummy(faker = "21..45")]
    pub age: i32,
    #[dummy(faker = "0..2")]
    pub gender_idx: usize,
    #[dummy(faker = "0..4")]
    pub religion_idx: usize,
    #[dummy(faker = "0..4")]
    pub mother_tongue_idx: usize,
    #[dummy(faker = "Title()")]
    pub profession: String,
    #[dummy(faker = "CityName()")]
    pub location: String,
    #[dummy(faker = "Sentence(6..14)")]
    pub bio: String,
    #[dummy(faker = "Words(2..4)")]
    pub hobbies: Vec<String>,
    #[dummy(faker = "Sentence(3..6)")]
    pub traits: String,
    #[dummy(faker = "0..4")]
    pub siblings: i32,
}

impl ProfileDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn to_profile(dummy: ProfileDummy) -> Profile {
        let now = Local::now().fixed_offset();
        let dob = NaiveDate::from_yo_opt(now.year() - dummy.age, 1);
        Profile {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            email: None,
            name: dummy.name,
            age: dummy.age,
            dob,
            birth_time: None,
            gender: GENDERS[dummy.gender_idx].to_string(),
            religion: Some(RELIGIONS[dummy.religion_idx].to_string()),
            caste: None,
            sub_caste: None,
            mother_tongue: Some(MOTHER_TONGUES[dummy.mother_tongue_idx].to_string()),
            profession: Some(dummy.profession),
            location: Some(dummy.location),
            education: None,
            height: None,
            income: None,
            marital_status: Some("Never Married".to_string()),
            bio: Some(dummy.bio),
            hobbies: dummy.hobbies,
            image_url: None,
            gallery: vec![],
            traits: Some(dummy.traits),
            partner_pref: None,
            father_occupation: None,
            mother_occupation: None,
            siblings: Some(dummy.siblings),
            family_location: None,
            family_status: None,
            verified: false,
            created_date: Some(now),
            updated_date: Some(now),
        }
    }

    pub fn generate_one(&self) -> Profile {
        Self::to_profile(Faker.fake::<ProfileDummy>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<Profile> {
        let mut result: Vec<Profile> = vec![];
        for _ in 0..num {
            result.push(Self::to_profile(Faker.fake::<Self>()));
        }
        result
    }
}
