mod create_superuser;
mod serve;

pub(crate) use create_superuser::create_superuser;
pub(crate) use serve::serve;
