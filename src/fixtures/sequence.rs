use crate::registry::entities::Ontology;
use crate::registry::value_objects::SubmissionId;

/// Computes the next submission identifier for an ontology.
pub struct SequenceAllocator;

impl SequenceAllocator {
    /// Returns the smallest positive identifier the ontology does not use yet.
    ///
    /// Submissions are appended in caller order and never removed one by one,
    /// so allocation walks 1, 2, 3 and never hands out an identifier twice
    /// within the ontology's lifetime.
    #[must_use]
    pub fn next(ontology: &Ontology) -> SubmissionId {
        let mut candidate = SubmissionId::FIRST;
        while ontology.submission(candidate).is_some() {
            candidate = candidate.next();
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::SequenceAllocator;
    use crate::registry::entities::{Contact, Ontology, Submission};
    use crate::registry::value_objects::{Acronym, SubmissionId};

    fn ontology() -> Ontology {
        let acronym = Acronym::new("TST-ONT-0").expect("valid acronym");
        Ontology::new(acronym, "Test Ontology", "tim")
    }

    fn submission(id: SubmissionId) -> Submission {
        let contact = Contact::new("Sheila", "sheila@example.org").expect("valid contact");
        Submission::new(id, "OWL", contact, Utc::now())
    }

    #[test]
    fn fresh_ontologies_allocate_from_one() {
        let mut ontology = ontology();
        for expected in 1..=4u32 {
            let id = SequenceAllocator::next(&ontology);
            assert_eq!(id.value(), expected);
            ontology.add_submission(submission(id)).expect("append");
        }
    }

    #[test]
    fn allocation_fills_the_smallest_gap() {
        let mut ontology = ontology();
        ontology
            .add_submission(submission(SubmissionId::new(1).expect("id")))
            .expect("append");
        ontology
            .add_submission(submission(SubmissionId::new(3).expect("id")))
            .expect("append");
        assert_eq!(SequenceAllocator::next(&ontology).value(), 2);
    }
}
