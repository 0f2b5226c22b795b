use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxProjectRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxSkillRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxExperienceRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxContentRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxAnalyticsRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxHealthRepo {
    pub pool: PgPool,
}
