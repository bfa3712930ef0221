use super::*;
use crate::error::ErrorKind;
use crate::test_backend::{FailPoint, TestBackend};
use chaser_api::source::CsvFileDataSource;
use chaser_api::statement::{Fact, Statement};
use std::cell::Cell;
use std::rc::Rc;
use test_case::test_case;
use Correctness::*;

fn c(name: &str) -> Term {
    Term::constant(name).unwrap()
}

fn u(name: &str) -> Term {
    Term::universal(name).unwrap()
}

fn e(name: &str) -> Term {
    Term::existential(name).unwrap()
}

fn lit(p: &str, terms: Vec<Term>) -> Literal {
    Literal::new(p, terms).unwrap()
}

fn fact(p: &str, constants: &[&str]) -> Statement {
    let predicate = Predicate::new(p, constants.len()).unwrap();
    Fact::new(predicate, constants.iter().map(|n| c(n)).collect())
        .unwrap()
        .into()
}

fn rule(head: Vec<Literal>, body: Vec<Literal>) -> Statement {
    Rule::new(head, body).unwrap().into()
}

/// q(x) :- p(x)
fn q_from_p() -> Statement {
    rule(vec![lit("q", vec![u("x")])], vec![lit("p", vec![u("x")])])
}

fn reasoner() -> Reasoner<TestBackend> {
    crate::test_setup();
    Reasoner::new(TestBackend::new())
}

fn collect(
    reasoner: &Reasoner<TestBackend>,
    kb: &KnowledgeBase,
    query: &Literal,
) -> (Vec<Vec<Term>>, Correctness) {
    let answers = reasoner.answer_query(kb, query, true).unwrap();
    let correctness = answers.correctness();
    let terms = answers.map(|a| a.unwrap().into_terms()).collect();
    (terms, correctness)
}

#[test]
fn lifecycle() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([fact("p", &["a"]), q_from_p()]).unwrap();

    assert_eq!(r.state(&kb), ReasonerState::NotLoaded);
    r.load(&kb).unwrap();
    assert_eq!(r.state(&kb), ReasonerState::Loaded);
    assert!(r.reason(&kb).unwrap());
    assert_eq!(r.state(&kb), ReasonerState::Materialized);
    kb.add_statement(fact("p", &["b"])).unwrap();
    assert_eq!(r.state(&kb), ReasonerState::Changed);
    assert!(r.reason(&kb).unwrap());
    assert_eq!(r.state(&kb), ReasonerState::Materialized);
    assert_eq!(r.backend().counts().loads, 2);
    assert_eq!(r.backend().counts().resets, 1);
    r.close();
    assert_eq!(r.state(&kb), ReasonerState::Closed);
}

#[test]
fn load_twice_is_noop() {
    let mut r = reasoner();
    let kb = KnowledgeBase::new();
    r.load(&kb).unwrap();
    r.load(&kb).unwrap();
    assert_eq!(r.backend().counts().loads, 1);
}

#[test]
fn reason_without_change_does_not_reload() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statement(fact("p", &["a"])).unwrap();
    r.reason(&kb).unwrap();
    r.reason(&kb).unwrap();
    assert_eq!(r.backend().counts().loads, 1);
    assert_eq!(r.backend().counts().materializations, 2);
}

#[test]
fn query_before_load() {
    let r = reasoner();
    let kb = KnowledgeBase::new();
    let err = r
        .answer_query(&kb, &lit("p", vec![u("x")]), true)
        .unwrap_err();
    assert!(matches!(err, ReasonerError::State(StateError::NotLoaded)));
}

#[test]
fn empty_knowledge_base() {
    let mut r = reasoner();
    let kb = KnowledgeBase::new();
    assert!(r.reason(&kb).unwrap());
    let (answers, correctness) = collect(&r, &kb, &lit("p", vec![u("x")]));
    assert!(answers.is_empty());
    assert_eq!(correctness, SoundAndComplete);
}

#[test]
fn explicit_facts_are_complete_before_reasoning() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([fact("p", &["a"]), q_from_p()]).unwrap();
    r.load(&kb).unwrap();
    assert_eq!(collect(&r, &kb, &lit("p", vec![u("x")])).1, SoundAndComplete);
    let (answers, correctness) = collect(&r, &kb, &lit("q", vec![u("x")]));
    assert!(answers.is_empty());
    assert_eq!(correctness, SoundButIncomplete);
}

#[test]
fn addition_then_reason() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([fact("p", &["c"]), q_from_p()]).unwrap();
    r.reason(&kb).unwrap();
    let q = lit("q", vec![u("x")]);
    assert_eq!(collect(&r, &kb, &q), (vec![vec![c("c")]], SoundAndComplete));

    kb.add_statement(fact("p", &["d"])).unwrap();
    assert_eq!(collect(&r, &kb, &q), (vec![vec![c("c")]], SoundButIncomplete));
    assert_eq!(
        collect(&r, &kb, &lit("p", vec![u("x")])),
        (vec![vec![c("c")]], SoundButIncomplete)
    );

    r.reason(&kb).unwrap();
    let (answers, correctness) = collect(&r, &kb, &q);
    assert_eq!(answers.len(), 2);
    assert_eq!(correctness, SoundAndComplete);
}

#[test]
fn removal_makes_answers_incorrect() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([fact("p", &["c"]), fact("p", &["d"]), q_from_p()])
        .unwrap();
    r.reason(&kb).unwrap();
    assert!(kb.remove_statement(&fact("p", &["c"])).unwrap());
    let q = lit("q", vec![u("x")]);
    let (answers, correctness) = collect(&r, &kb, &q);
    assert_eq!(answers.len(), 2);
    assert_eq!(correctness, Incorrect);
    kb.add_statement(fact("unrelated", &["z"])).unwrap();
    assert_eq!(
        collect(&r, &kb, &lit("unrelated", vec![u("x")])).1,
        SoundButIncomplete
    );
}

#[test]
fn mixed_origins_make_answers_incorrect() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([
        fact("q", &["a"]),
        fact("p", &["b"]),
        q_from_p(),
        fact("r", &["c"]),
    ])
    .unwrap();
    r.reason(&kb).unwrap();
    kb.add_statement(fact("q", &["d"])).unwrap();
    assert_eq!(collect(&r, &kb, &lit("q", vec![u("x")])).1, Incorrect);
    assert_eq!(collect(&r, &kb, &lit("r", vec![u("x")])).1, SoundButIncomplete);
}

#[test]
fn rule_over_mixed_predicate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("p.csv");
    std::fs::write(&path, "b\n").unwrap();
    let predicate = Predicate::new("p", 1).unwrap();
    let s_from_p = rule(vec![lit("s", vec![u("x")])], vec![lit("p", vec![u("x")])]);

    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([
        fact("p", &["a"]),
        DataSourceDeclaration::new(predicate, CsvFileDataSource::new(&path).with_arity(1)).into(),
    ])
    .unwrap();
    r.reason(&kb).unwrap();
    let p = lit("p", vec![u("x")]);
    let s = lit("s", vec![u("x")]);
    assert_eq!(collect(&r, &kb, &p).1, SoundAndComplete);

    kb.add_statement(s_from_p.clone()).unwrap();
    let (answers, correctness) = collect(&r, &kb, &p);
    assert_eq!(answers.len(), 2);
    assert!(answers.contains(&vec![c("b")]));
    assert_eq!(correctness, SoundButIncomplete);
    assert_eq!(collect(&r, &kb, &s), (vec![], SoundButIncomplete));

    r.reason(&kb).unwrap();
    assert_eq!(collect(&r, &kb, &s).0.len(), 2);
    assert!(kb.remove_statement(&s_from_p).unwrap());
    assert_eq!(collect(&r, &kb, &p).1, SoundButIncomplete);
    assert_eq!(collect(&r, &kb, &s).1, Incorrect);
}

#[test]
fn non_stratifiable_rules() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    let neg = Literal::negative(Predicate::new("q", 1).unwrap(), vec![u("x")]).unwrap();
    kb.add_statements([
        fact("p", &["a"]),
        rule(vec![lit("q", vec![u("x")])], vec![lit("p", vec![u("x")]), neg]),
    ])
    .unwrap();
    let err = r.reason(&kb).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        ReasonerError::Configuration(ConfigurationError::NotStratifiable { .. })
    ));
    assert_eq!(r.state(&kb), ReasonerState::NotLoaded);
    assert_eq!(r.backend().counts().loads, 0);
}

#[test]
fn stratified_negation() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    let neg = Literal::negative(Predicate::new("r", 1).unwrap(), vec![u("x")]).unwrap();
    kb.add_statements([
        fact("p", &["a"]),
        fact("p", &["b"]),
        fact("r", &["b"]),
        rule(vec![lit("q", vec![u("x")])], vec![lit("p", vec![u("x")]), neg]),
    ])
    .unwrap();
    r.reason(&kb).unwrap();
    let q = lit("q", vec![u("x")]);
    assert_eq!(collect(&r, &kb, &q), (vec![vec![c("a")]], SoundAndComplete));
    kb.add_statement(fact("r", &["a"])).unwrap();
    assert_eq!(collect(&r, &kb, &q).1, Incorrect);
}

/// q(y, !z) :- q(x, y)
fn infinite_chain(kb: &mut KnowledgeBase) {
    kb.add_statements([
        fact("q", &["a", "b"]),
        rule(
            vec![lit("q", vec![u("y"), e("z")])],
            vec![lit("q", vec![u("x"), u("y")])],
        ),
    ])
    .unwrap();
}

#[test]
fn timeout() {
    crate::test_setup();
    let config = ReasonerConfig::new()
        .with_algorithm(Algorithm::SkolemChase)
        .with_timeout(1);
    let backend = TestBackend::new().with_rounds_per_second(3);
    let mut r = Reasoner::with_config(backend, config).unwrap();
    let mut kb = KnowledgeBase::new();
    infinite_chain(&mut kb);
    assert!(!r.reason(&kb).unwrap());
    assert_eq!(r.state(&kb), ReasonerState::Materialized);
    let (answers, correctness) = collect(&r, &kb, &lit("q", vec![u("x"), u("y")]));
    assert_eq!(answers.len(), 4);
    assert_eq!(correctness, SoundButIncomplete);
}

#[test]
fn zero_timeout_is_rejected() {
    crate::test_setup();
    let config = ReasonerConfig::new().with_timeout(0);
    let err = Reasoner::with_config(TestBackend::new(), config).unwrap_err();
    assert!(matches!(
        err,
        ReasonerError::Configuration(ConfigurationError::InvalidTimeout)
    ));
    let mut r = reasoner();
    assert!(r.set_timeout(Some(0)).is_err());
    assert!(r.set_timeout(Some(5)).is_ok());
    assert_eq!(r.config().timeout(), Some(5));
    assert!(r.set_timeout(None).is_ok());
    assert_eq!(r.config().timeout(), None);
}

#[test]
fn aliased_data_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.csv");
    std::fs::write(&path, "c,d\n").unwrap();
    let predicate = Predicate::new("knows", 2).unwrap();

    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([
        fact("knows", &["a", "b"]),
        DataSourceDeclaration::new(predicate, CsvFileDataSource::new(&path).with_arity(2)).into(),
    ])
    .unwrap();
    r.reason(&kb).unwrap();

    let config = r.backend().edb_config();
    assert!(config.starts_with("EDB0_predname=knows##alias0\nEDB0_type=INMEMORY\n"));
    assert!(config.ends_with("EDB0_param1=people\n"));
    assert_eq!(r.backend().rules().len(), 1);
    let (answers, correctness) = collect(&r, &kb, &lit("knows", vec![u("x"), u("y")]));
    assert_eq!(answers.len(), 2);
    assert!(answers.contains(&vec![c("c"), c("d")]));
    assert_eq!(correctness, SoundAndComplete);

    // adding facts to a predicate with several origins
    kb.add_statement(fact("knows", &["e", "f"])).unwrap();
    assert_eq!(
        collect(&r, &kb, &lit("knows", vec![u("x"), u("y")])).1,
        Incorrect
    );
}

#[test]
fn single_data_source_is_not_aliased() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.csv");
    std::fs::write(&path, "c,d\n").unwrap();
    let predicate = Predicate::new("knows", 2).unwrap();

    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statement(DataSourceDeclaration::new(predicate, CsvFileDataSource::new(&path)))
        .unwrap();
    r.reason(&kb).unwrap();
    assert!(r.backend().edb_config().starts_with("EDB0_predname=knows\n"));
    assert!(r.backend().rules().is_empty());
    let (answers, _) = collect(&r, &kb, &lit("knows", vec![u("x"), u("y")]));
    assert_eq!(answers, vec![vec![c("c"), c("d")]]);
}

#[test]
fn source_arity_mismatch() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let predicate = Predicate::new("knows", 2).unwrap();
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statement(DataSourceDeclaration::new(
        predicate,
        CsvFileDataSource::new(file.path()).with_arity(3),
    ))
    .unwrap();
    let err = r.load(&kb).unwrap_err();
    assert!(matches!(
        err,
        ReasonerError::Configuration(ConfigurationError::SourceArityMismatch { found: 3, .. })
    ));
}

#[test]
fn missing_data_source() {
    let predicate = Predicate::new("knows", 2).unwrap();
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statement(DataSourceDeclaration::new(
        predicate,
        CsvFileDataSource::new("/this/file/does/not/exist.csv"),
    ))
    .unwrap();
    let err = r.load(&kb).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!err.is_fatal());
    assert_eq!(r.state(&kb), ReasonerState::NotLoaded);
}

#[test]
fn invalid_queries() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statement(fact("p", &["a"])).unwrap();
    r.load(&kb).unwrap();

    let neg = Literal::negative(Predicate::new("p", 1).unwrap(), vec![u("x")]).unwrap();
    let err = r.answer_query(&kb, &neg, true).unwrap_err();
    assert!(matches!(
        err,
        ReasonerError::Configuration(ConfigurationError::NegativeQuery(_))
    ));

    let err = r
        .answer_query(&kb, &lit("p", vec![u("x"), u("y")]), true)
        .unwrap_err();
    assert!(matches!(
        err,
        ReasonerError::Configuration(ConfigurationError::QueryArityMismatch {
            expected: 1,
            found: 2,
            ..
        })
    ));
}

#[test]
fn named_nulls_in_answers() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([
        fact("p", &["c"]),
        rule(
            vec![lit("q", vec![u("x"), e("y")]), lit("q", vec![u("x"), e("z")])],
            vec![lit("p", vec![u("x")])],
        ),
    ])
    .unwrap();
    r.reason(&kb).unwrap();

    let q = lit("q", vec![c("c"), u("y")]);
    let with_nulls: Vec<_> = r
        .answer_query(&kb, &q, true)
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(with_nulls.len(), 2);
    assert_ne!(with_nulls[0][1], with_nulls[1][1]);
    assert_eq!(r.answer_query(&kb, &q, false).unwrap().count(), 0);
    assert_eq!(
        r.answer_query(&kb, &lit("q", vec![u("y"), u("y")]), true)
            .unwrap()
            .count(),
        0
    );
}

#[test_case(true, 2; "with nulls")]
#[test_case(false, 1; "without nulls")]
fn count_answers(include_nulls: bool, expected: u64) {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([
        fact("p", &["a"]),
        fact("p", &["b"]),
        fact("q", &["a", "a"]),
        rule(
            vec![lit("q", vec![u("x"), e("y")])],
            vec![lit("p", vec![u("x")])],
        ),
    ])
    .unwrap();
    r.reason(&kb).unwrap();
    let count = r
        .count_query_answers(&kb, &lit("q", vec![u("x"), u("y")]), include_nulls)
        .unwrap();
    assert_eq!(count.count, expected);
    assert_eq!(count.correctness, SoundAndComplete);
}

#[test]
fn count_with_repeated_variables() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([fact("q", &["a", "a"]), fact("q", &["a", "b"])])
        .unwrap();
    r.reason(&kb).unwrap();
    let count = r
        .count_query_answers(&kb, &lit("q", vec![u("x"), u("x")]), true)
        .unwrap();
    assert_eq!(count.count, 1);
}

#[test]
fn export_without_answers_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statement(fact("p", &["a"])).unwrap();
    r.reason(&kb).unwrap();
    let correctness = r
        .export_query_answers_to_csv(&kb, &lit("p", vec![c("b")]), &path, true)
        .unwrap();
    assert_eq!(correctness, SoundAndComplete);
    assert!(!path.exists());

    std::fs::write(&path, "previous content\n").unwrap();
    r.export_query_answers_to_csv(&kb, &lit("p", vec![c("b")]), &path, true)
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous content\n");
}

#[test]
fn export_with_named_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([
        fact("p", &["a,b"]),
        rule(
            vec![lit("q", vec![u("x"), e("y")])],
            vec![lit("p", vec![u("x")])],
        ),
    ])
    .unwrap();
    r.reason(&kb).unwrap();
    r.export_query_answers_to_csv(&kb, &lit("q", vec![u("x"), u("y")]), &path, true)
        .unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    let (first, null) = content.trim_end().split_once("\",").unwrap();
    assert_eq!(first, "\"a,b");
    assert_eq!(null.len(), chaser_api::skolem::SKOLEM_NAME_LEN);
    assert!(chaser_api::skolem::SkolemName::parse(null).is_some());
}

#[test]
fn for_each_inference() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([fact("p", &["a"]), fact("p", &["b"]), q_from_p()])
        .unwrap();
    r.reason(&kb).unwrap();
    let mut seen = vec![];
    let correctness = r
        .for_each_inference(&kb, |p, answer| seen.push((p.name().to_string(), answer.to_string())))
        .unwrap();
    assert_eq!(correctness, SoundAndComplete);
    assert_eq!(seen.len(), 4);
    assert!(seen.contains(&("q".to_string(), "[b]".to_string())));

    kb.remove_statement(&fact("p", &["b"])).unwrap();
    let correctness = r.for_each_inference(&kb, |_, _| {}).unwrap();
    assert_eq!(correctness, Incorrect);
}

#[test]
fn foreign_knowledge_base() {
    let mut r = reasoner();
    let kb1 = KnowledgeBase::new();
    let kb2 = KnowledgeBase::new();
    r.load(&kb1).unwrap();
    let err = r.load(&kb2).unwrap_err();
    assert!(matches!(
        err,
        ReasonerError::State(StateError::ForeignKnowledgeBase { .. })
    ));
    assert!(r
        .answer_query(&kb2, &lit("p", vec![u("x")]), true)
        .is_err());

    r.reset_reasoner().unwrap();
    assert_eq!(r.state(&kb1), ReasonerState::NotLoaded);
    r.load(&kb2).unwrap();
    assert_eq!(r.state(&kb2), ReasonerState::Loaded);
}

#[test]
fn backend_failure_during_materialization() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statement(fact("p", &["a"])).unwrap();
    r.reason(&kb).unwrap();
    r.backend_mut().fail_on(FailPoint::Materialize);
    let err = r.reason(&kb).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);
    assert_eq!(r.state(&kb), ReasonerState::Loaded);
    assert!(r.reason(&kb).unwrap());
    assert_eq!(r.state(&kb), ReasonerState::Materialized);
}

#[test]
fn backend_failure_during_load() {
    let mut r = reasoner();
    let kb = KnowledgeBase::new();
    r.backend_mut().fail_on(FailPoint::Load);
    assert_eq!(r.load(&kb).unwrap_err().kind(), ErrorKind::Backend);
    assert_eq!(r.state(&kb), ReasonerState::NotLoaded);
    r.load(&kb).unwrap();
    assert_eq!(r.state(&kb), ReasonerState::Loaded);
}

#[test]
fn backend_failure_during_query() {
    let mut r = reasoner();
    let kb = KnowledgeBase::new();
    r.load(&kb).unwrap();
    r.backend_mut().fail_on(FailPoint::Query);
    let err = r
        .answer_query(&kb, &lit("p", vec![u("x")]), true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);
}

#[test]
fn acyclicity() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statements([fact("p", &["a"]), q_from_p()]).unwrap();
    assert_eq!(
        r.check_acyclicity(&kb, AcyclicityNotion::JointAcyclicity)
            .unwrap(),
        CyclicityResult::Acyclic
    );
    assert_eq!(r.state(&kb), ReasonerState::Loaded);

    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    infinite_chain(&mut kb);
    assert_eq!(
        r.check_acyclicity(&kb, AcyclicityNotion::ModelFaithfulAcyclicity)
            .unwrap(),
        CyclicityResult::Undetermined
    );
}

#[test]
fn split_head_pieces() {
    let mut r = reasoner();
    r.set_rule_rewrite_strategy(RuleRewriteStrategy::SplitHeadPieces);
    let mut kb = KnowledgeBase::new();
    kb.add_statement(rule(
        vec![lit("q", vec![u("x")]), lit("r", vec![e("y")])],
        vec![lit("p", vec![u("x")])],
    ))
    .unwrap();
    r.load(&kb).unwrap();
    assert_eq!(r.backend().rules().len(), 2);
}

#[test]
fn log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backend.log");
    let mut r = reasoner();
    r.set_log_level(LogLevel::Info);
    r.set_log_file(Some(path.clone()));
    r.reason(&KnowledgeBase::new()).unwrap();
    assert!(!std::fs::read_to_string(&path).unwrap().is_empty());
}

#[test]
fn close_is_idempotent() {
    let mut r = reasoner();
    let kb = KnowledgeBase::new();
    r.load(&kb).unwrap();
    r.close();
    r.close();
    assert!(r.is_closed());
    assert_eq!(r.backend().counts().stops, 1);
    for err in [
        r.load(&kb).unwrap_err(),
        r.reason(&kb).unwrap_err(),
        r.answer_query(&kb, &lit("p", vec![u("x")]), true).unwrap_err(),
        r.reset_reasoner().unwrap_err(),
    ] {
        assert!(matches!(err, ReasonerError::State(StateError::Closed)));
    }
}

#[test]
fn mutation_after_close() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statement(fact("p", &["a"])).unwrap();
    r.reason(&kb).unwrap();
    r.close();
    let version = kb.version();

    let err = kb.add_statement(fact("p", &["b"])).unwrap_err();
    assert!(matches!(err, chaser_inmem::KbError::SessionClosed(_)));
    assert!(err.is_state_error());
    assert!(kb
        .remove_statement(&fact("p", &["a"]))
        .unwrap_err()
        .is_state_error());
    assert_eq!(kb.version(), version);

    drop(r);
    assert!(kb.add_statement(fact("p", &["b"])).unwrap());
    assert!(kb.remove_statement(&fact("p", &["a"])).unwrap());
}

#[test]
fn removal_before_first_load() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statement(fact("p", &["a"])).unwrap();
    r.bind(&kb).unwrap();
    assert_eq!(r.state(&kb), ReasonerState::NotLoaded);
    assert!(matches!(
        r.bind(&KnowledgeBase::new()),
        Err(ReasonerError::State(StateError::ForeignKnowledgeBase { .. }))
    ));

    assert!(kb.add_statement(fact("p", &["b"])).unwrap());
    let err = kb.remove_statement(&fact("p", &["a"])).unwrap_err();
    assert!(matches!(err, chaser_inmem::KbError::NotLoaded(_)));

    // a failed load does not count
    r.backend_mut().fail_on(FailPoint::Load);
    assert!(r.load(&kb).is_err());
    assert!(kb
        .remove_statement(&fact("p", &["a"]))
        .unwrap_err()
        .is_state_error());

    r.load(&kb).unwrap();
    assert!(kb.remove_statement(&fact("p", &["a"])).unwrap());
    assert_eq!(r.state(&kb), ReasonerState::Changed);
    // still allowed after a reload failure
    r.backend_mut().fail_on(FailPoint::Load);
    assert!(r.load(&kb).is_err());
    assert!(kb.remove_statement(&fact("p", &["b"])).unwrap());
}

#[test]
fn reset_releases_knowledge_base() {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statement(fact("p", &["a"])).unwrap();
    r.bind(&kb).unwrap();
    assert!(kb.remove_statement(&fact("p", &["a"])).is_err());
    r.reset_reasoner().unwrap();
    assert!(kb.remove_statement(&fact("p", &["a"])).unwrap());
    r.close();
    assert!(kb.add_statement(fact("p", &["a"])).unwrap());
}

#[test_case(1)]
#[test_case(100)]
fn change_log_stays_bounded(cycles: usize) {
    let mut r = reasoner();
    let mut kb = KnowledgeBase::new();
    kb.add_statement(q_from_p()).unwrap();
    r.reason(&kb).unwrap();
    for i in 0..cycles {
        let name = format!("c{i}");
        let f = fact("p", &[name.as_str()]);
        kb.add_statement(f.clone()).unwrap();
        r.reason(&kb).unwrap();
        assert!(kb.remove_statement(&f).unwrap());
        r.reason(&kb).unwrap();
    }
    assert_eq!(kb.change_log().len(), 2);
    assert_eq!(collect(&r, &kb, &lit("q", vec![u("x")])), (vec![], SoundAndComplete));
}

/// Counts the calls to [`Backend::stop`] outside of the reasoner.
struct Stoppable(TestBackend, Rc<Cell<usize>>);

impl Backend for Stoppable {
    fn configure(&mut self, edb_config: &str) -> BackendResult<()> {
        self.0.configure(edb_config)
    }
    fn set_rules(&mut self, rules: &[Rule], strategy: RuleRewriteStrategy) -> BackendResult<()> {
        self.0.set_rules(rules, strategy)
    }
    fn add_facts(&mut self, predicate: &Predicate, tuples: &[Vec<Term>]) -> BackendResult<()> {
        self.0.add_facts(predicate, tuples)
    }
    fn load(&mut self) -> BackendResult<()> {
        self.0.load()
    }
    fn materialize(&mut self, algorithm: Algorithm, timeout: Option<u32>) -> BackendResult<bool> {
        self.0.materialize(algorithm, timeout)
    }
    fn query(
        &self,
        query: &Literal,
        include_constants: bool,
        include_named_nulls: bool,
    ) -> BackendResult<chaser_api::backend::BackendAnswers<'_>> {
        self.0.query(query, include_constants, include_named_nulls)
    }
    fn extension_size(&self, query: &Literal) -> BackendResult<u64> {
        self.0.extension_size(query)
    }
    fn reset(&mut self) -> BackendResult<()> {
        self.0.reset()
    }
    fn stop(&mut self) {
        self.1.set(self.1.get() + 1);
        self.0.stop()
    }
}

#[test]
fn drop_closes() {
    crate::test_setup();
    let stops = Rc::new(Cell::new(0));
    {
        let mut r = Reasoner::new(Stoppable(TestBackend::new(), stops.clone()));
        r.reason(&KnowledgeBase::new()).unwrap();
    }
    assert_eq!(stops.get(), 1);
    {
        let mut r = Reasoner::new(Stoppable(TestBackend::new(), stops.clone()));
        r.close();
    }
    assert_eq!(stops.get(), 2);
}
