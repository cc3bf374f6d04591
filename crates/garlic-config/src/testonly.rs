//! Models shared by unit tests.

use crate::{
    field::{IntegerField, StringField},
    model, Field,
};

model! {
    /// Information about a person.
    pub(crate) struct InfoConfig {
        /// Age in years.
        age: Field::builder(IntegerField::with_domain(1..=100)).with_default(21),
        working: Field::boolean().with_default(false),
        kids: Field::array(Field::model::<KidConfig>()),
    }
}

model! {
    pub(crate) struct KidConfig {
        name: Field::string().required(),
        age: Field::integer(),
    }
}

model! {
    /// Person configuration.
    pub(crate) struct PersonConfig {
        /// Full name of the person.
        name: Field::string().required(),
        info: Field::model::<InfoConfig>(),
        city: Field::builder(StringField::with_choices(["Paris", "Berlin"])),
        tags: Field::array(Field::string()).with_default(vec!["default"]),
    }
}

model! {
    pub(crate) struct ParentModel {
        name: Field::string().with_default("parent"),
        age: Field::integer().with_default(50),
    }
}

model! {
    pub(crate) struct OtherParentModel {
        age: Field::integer().with_default(70),
        email: Field::string().desc("Contact email"),
    }
}

model! {
    pub(crate) struct ChildModel: ParentModel, OtherParentModel {
        age: Field::integer().with_default(10),
        school: Field::string(),
    }
}

model! {
    pub(crate) struct GrandchildModel: ChildModel {
        toy: Field::string().with_default("car"),
    }
}

model! {
    pub(crate) struct EmptyModel {}
}
