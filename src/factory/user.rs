use chrono::{DateTime, FixedOffset};
use fake::{faker::internet::en::SafeEmail, Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::user::User;

pub struct UserFactory<T: Clone> {
    modifier_one: fn(x: &User, ext: T) -> User,
    modifier_many: fn(x: &User, idx: usize, ext: T) -> User,
}

impl<T: Clone> Default for UserFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> UserFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &User, ext: T) -> User) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &User, idx: usize, ext: T) -> User) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<User> {
        let data = UserDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(
            r#"
        INSERT INTO public.user (id, email, password, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(data.id)
        .bind(&data.email)
        .bind(&data.password)
        .bind(data.created_date)
        .bind(data.updated_date)
        .execute(db)
        .await?;
        Ok(data.clone())
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<User>> {
        let data = UserDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<User> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(
                r#"INSERT INTO public.user (id, email, password, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(item.id)
            .bind(&item.email)
            .bind(&item.password)
            .bind(item.created_date)
            .bind(item.updated_date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct UserDummy {
    pub id: Uuid,
    #[dummy(faker = "SafeEmail()")]
    pub email: String,
    pub password: String,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl UserDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn to_user(dummy: UserDummy) -> User {
        User {
            // random v4 ids from the faker would break time ordering
            id: Uuid::now_v7(),
            email: format!("{}.{}", dummy.id.simple(), dummy.email),
            password: dummy.password,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
        }
    }

    pub fn generate_one(&self) -> User {
        Self::to_user(Faker.fake::<UserDummy>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<User> {
        let mut result: Vec<User> = vec![];
        for _ in 0..num {
            result.push(Self::to_user(Faker.fake::<Self>()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, Local};
    use sqlx::PgPool;
    use uuid::Uuid;

    use crate::{factory::user::UserFactory, model::user::User};

    #[derive(Clone)]
    struct ExtData {
        pub id: Uuid,
        pub created_date: DateTime<FixedOffset>,
    }

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = UserFactory::new();
        factory.generate_one(&pool, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.user"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_one_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = UserFactory::<ExtData>::new();
        factory.modified_one(|data, ext| User {
            id: ext.id,
            email: "test_user@local.com".to_string(),
            password: data.password.clone(),
            created_date: Some(ext.created_date),
            updated_date: Some(ext.created_date),
        });
        let ext = ExtData {
            id: Uuid::now_v7(),
            created_date: Local::now().fixed_offset(),
        };
        factory.generate_one(&pool, ext.clone()).await?;

        // Expect
        let res: (Uuid, String, Option<DateTime<FixedOffset>>) =
            sqlx::query_as(r#"SELECT id, email, created_date FROM public.user"#)
                .fetch_one(&pool)
                .await?;
        assert_eq!(res.0, ext.id);
        assert_eq!(res.1, "test_user@local.com".to_string());
        assert!(res.2.is_some());
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = UserFactory::new();
        let users = factory.generate_many(&pool, 10, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(DISTINCT email) FROM public.user"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 10);
        assert_eq!(users.len(), 10);
        Ok(())
    }
}
