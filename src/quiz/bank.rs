use std::collections::BTreeMap;

use crate::quiz::{Level, Question, LEVELS};

/// An immutable, ordered set of questions. Built once and shared by reference;
/// nothing mutates it after construction.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The reference grammar catalogue: 20 questions per level.
    pub fn standard() -> Self {
        Self::new(standard_questions())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions of one level, in bank order.
    pub fn pool(&self, level: Level) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.level == level)
            .cloned()
            .collect()
    }

    pub fn level_counts(&self) -> BTreeMap<Level, usize> {
        let mut counts: BTreeMap<Level, usize> = LEVELS.into_iter().map(|l| (l, 0)).collect();
        for question in &self.questions {
            *counts.entry(question.level).or_insert(0) += 1;
        }
        counts
    }
}

fn q(id: &str, text: &str, options: [&str; 3], correct_answer: u8, explanation: &str, level: Level) -> Question {
    Question::new(id, text, options, correct_answer, explanation, level)
}

fn standard_questions() -> Vec<Question> {
    use Level::*;

    vec![
        // basic
        q("b1", "She ___ to the store yesterday.", ["go", "went", "goes"], 1, "\"Went\" is the past tense of \"go.\" Use past tense for completed actions.", Basic),
        q("b2", "They ___ playing in the park.", ["is", "am", "are"], 2, "\"Are\" is used with plural subjects like \"they.\"", Basic),
        q("b3", "I have ___ apple.", ["a", "an", "the"], 1, "\"An\" is used before words starting with vowel sounds.", Basic),
        q("b4", "The cat is ___ the table.", ["on", "at", "in"], 0, "\"On\" indicates position above and touching a surface.", Basic),
        q("b5", "She ___ her homework every day.", ["do", "does", "doing"], 1, "\"Does\" is used with third-person singular subjects in present tense.", Basic),
        q("b6", "___ you like coffee?", ["Do", "Does", "Is"], 0, "\"Do\" is used to form questions with \"you.\"", Basic),
        q("b7", "He is ___ than his brother.", ["tall", "taller", "tallest"], 1, "Comparative adjectives (\"taller\") are used when comparing two things.", Basic),
        q("b8", "We ___ English at school.", ["learn", "learns", "learning"], 0, "\"Learn\" is the base form used with \"we.\"", Basic),
        q("b9", "This is ___ book.", ["my", "me", "I"], 0, "\"My\" is a possessive adjective used before nouns.", Basic),
        q("b10", "There ___ many students in the class.", ["is", "are", "be"], 1, "\"Are\" is used with plural nouns like \"students.\"", Basic),
        q("b11", "She can ___ very well.", ["sings", "singing", "sing"], 2, "After modal verbs like \"can,\" use the base form of the verb.", Basic),
        q("b12", "I ___ breakfast at 7 AM.", ["have", "has", "having"], 0, "\"Have\" is used with \"I\" in simple present tense.", Basic),
        q("b13", "The children ___ in the garden.", ["plays", "play", "playing"], 1, "\"Children\" is plural, so use \"play\" without the -s.", Basic),
        q("b14", "He ___ a new car last week.", ["buy", "buys", "bought"], 2, "\"Bought\" is the past tense of \"buy.\"", Basic),
        q("b15", "My sister is ___ doctor.", ["a", "an", "the"], 0, "\"A\" is used before consonant sounds.", Basic),
        q("b16", "___ are you going?", ["Where", "What", "Who"], 0, "\"Where\" asks about location or destination.", Basic),
        q("b17", "I ___ see you tomorrow.", ["will", "would", "was"], 0, "\"Will\" is used to express future actions.", Basic),
        q("b18", "She gave the book to ___.", ["I", "me", "my"], 1, "\"Me\" is an object pronoun used after prepositions.", Basic),
        q("b19", "They ___ TV every evening.", ["watch", "watches", "watched"], 0, "\"Watch\" is used with \"they\" in simple present.", Basic),
        q("b20", "The sun ___ in the east.", ["rise", "rises", "rising"], 1, "\"Rises\" is used for habitual facts with singular subjects.", Basic),

        // intermediate
        q("i1", "By the time she arrived, we ___ already left.", ["have", "had", "has"], 1, "Past perfect \"had\" is used for actions completed before another past action.", Intermediate),
        q("i2", "If I ___ rich, I would travel the world.", ["am", "were", "was"], 1, "\"Were\" is used in second conditional for unreal present situations.", Intermediate),
        q("i3", "She asked me ___ I was coming to the party.", ["that", "if", "what"], 1, "\"If\" introduces indirect yes/no questions.", Intermediate),
        q("i4", "I wish I ___ more time to read.", ["have", "had", "having"], 1, "\"Wish + past tense\" expresses desires for present situations.", Intermediate),
        q("i5", "The book, ___ I bought yesterday, is very interesting.", ["that", "which", "what"], 1, "\"Which\" introduces non-defining relative clauses with commas.", Intermediate),
        q("i6", "He ___ be at home; his car is in the driveway.", ["must", "might", "can"], 0, "\"Must\" expresses strong logical deduction.", Intermediate),
        q("i7", "I'm used to ___ early in the morning.", ["wake", "waking", "woke"], 1, "\"Used to\" + gerund describes habits we are accustomed to.", Intermediate),
        q("i8", "Neither the teacher nor the students ___ present.", ["was", "were", "is"], 1, "With \"neither...nor,\" the verb agrees with the nearest subject.", Intermediate),
        q("i9", "The meeting has been ___ until next week.", ["postponed", "postponing", "postpone"], 0, "Past participle is used after \"has been\" in passive voice.", Intermediate),
        q("i10", "She suggested ___ to the beach.", ["to go", "going", "go"], 1, "\"Suggest\" is followed by a gerund.", Intermediate),
        q("i11", "Despite ___ tired, she continued working.", ["being", "be", "to be"], 0, "\"Despite\" is followed by a gerund or noun.", Intermediate),
        q("i12", "You'd better ___ now or you'll be late.", ["leave", "to leave", "leaving"], 0, "\"Had better\" is followed by the base form of the verb.", Intermediate),
        q("i13", "Not only ___ intelligent, but also hardworking.", ["she is", "is she", "she was"], 1, "\"Not only\" at the start causes subject-verb inversion.", Intermediate),
        q("i14", "I'd rather you ___ smoke in here.", ["don't", "didn't", "won't"], 1, "\"Would rather\" + subject takes past tense for present meaning.", Intermediate),
        q("i15", "It's high time we ___ a decision.", ["make", "made", "making"], 1, "\"It's high time\" is followed by past tense.", Intermediate),
        q("i16", "The more you practice, ___ you become.", ["better", "the better", "best"], 1, "\"The + comparative...the + comparative\" shows parallel increase.", Intermediate),
        q("i17", "He denied ___ the window.", ["break", "breaking", "to break"], 1, "\"Deny\" is followed by a gerund.", Intermediate),
        q("i18", "Were I you, I ___ accept the offer.", ["will", "would", "shall"], 1, "Inverted conditionals use \"would\" in the main clause.", Intermediate),
        q("i19", "Hardly had I arrived ___ it started raining.", ["than", "when", "then"], 1, "\"Hardly...when\" is a correlative conjunction pair.", Intermediate),
        q("i20", "She's ___ to have won the lottery.", ["reported", "reporting", "reports"], 0, "Passive reporting structure uses past participle.", Intermediate),

        // advanced
        q("a1", "Had I known about the meeting, I ___ attended.", ["would have", "will have", "had"], 0, "Third conditional with inversion uses \"would have\" + past participle.", Advanced),
        q("a2", "The phenomenon ___ he referred is quite rare.", ["which", "to which", "that"], 1, "\"Refer to\" requires the preposition before the relative pronoun.", Advanced),
        q("a3", "Scarcely had he finished speaking ___ the audience applauded.", ["than", "when", "that"], 1, "\"Scarcely...when\" is the correct correlative pair for immediate sequence.", Advanced),
        q("a4", "It is imperative that he ___ present at the hearing.", ["is", "be", "was"], 1, "Subjunctive mood uses base form after \"imperative that.\"", Advanced),
        q("a5", "So ___ was her performance that everyone was moved.", ["touching", "touched", "touchingly"], 0, "After \"so + adjective\" in this emphatic structure, use the adjective form.", Advanced),
        q("a6", "___ circumstances should you reveal this information.", ["Under no", "In no", "By no"], 0, "\"Under no circumstances\" is the idiomatic phrase meaning \"never.\"", Advanced),
        q("a7", "The theory, ___ validity is still debated, has many supporters.", ["which", "whose", "that"], 1, "\"Whose\" shows possession for things as well as people.", Advanced),
        q("a8", "Much ___ I admire her work, I disagree with her conclusions.", ["as", "that", "while"], 0, "\"Much as\" introduces a concessive clause meaning \"although.\"", Advanced),
        q("a9", "The data ___ to support the hypothesis.", ["seem", "seems", "seeming"], 0, "\"Data\" is traditionally plural and takes \"seem.\"", Advanced),
        q("a10", "They demanded that the report ___ immediately.", ["is submitted", "be submitted", "was submitted"], 1, "Subjunctive mood in passive form: \"be + past participle.\"", Advanced),
        q("a11", "The committee ___ divided on this issue.", ["is", "are", "were"], 1, "\"Committee\" is collective; when divided, treat as plural.", Advanced),
        q("a12", "Little ___ he know what awaited him.", ["do", "did", "does"], 1, "Negative adverb \"little\" causes inversion with past tense.", Advanced),
        q("a13", "She spoke ___ she had rehearsed for months.", ["as if", "as though", "as"], 2, "\"As\" here introduces a manner clause meaning \"in the way that.\"", Advanced),
        q("a14", "No sooner had the concert ended ___ the rain began.", ["than", "when", "that"], 0, "\"No sooner...than\" is the correct correlative pair.", Advanced),
        q("a15", "Were it not for his intervention, we ___ failed.", ["would have", "will have", "should have"], 0, "Inverted third conditional uses \"would have\" for past unreal.", Advanced),
        q("a16", "It is essential that every member ___ informed.", ["is", "be", "being"], 1, "Mandative subjunctive requires base form \"be.\"", Advanced),
        q("a17", "The issue ___ which we are concerned is urgent.", ["about", "with", "for"], 1, "\"Concerned with\" is the correct collocation for topics.", Advanced),
        q("a18", "Only after the test ___ the results released.", ["the results were", "were", "was"], 1, "Fronted adverbial \"Only after\" causes subject-verb inversion.", Advanced),
        q("a19", "Such was his anger ___ he could barely speak.", ["as", "that", "which"], 1, "\"Such...that\" introduces a result clause.", Advanced),
        q("a20", "The contract stipulates that payment ___ within 30 days.", ["is made", "be made", "will be made"], 1, "Subjunctive after \"stipulates that\" uses base form.", Advanced),

        // upper-advanced
        q("u1", "Far ___ it from me to criticize, but this approach seems flawed.", ["be", "is", "being"], 0, "\"Far be it from me\" is a fixed subjunctive expression.", UpperAdvanced),
        q("u2", "The findings notwithstanding, the board ___ to proceed.", ["decide", "decided", "deciding"], 1, "Main clause requires finite verb; past tense fits narrative.", UpperAdvanced),
        q("u3", "So complex is the matter ___ simple solutions are inadequate.", ["as", "that", "which"], 1, "Inverted \"so...that\" structure for emphasis.", UpperAdvanced),
        q("u4", "The phenomenon, ___ the researchers are at a loss to explain, persists.", ["which", "for which", "that"], 0, "\"Which\" as object of the clause; preposition moves with verb.", UpperAdvanced),
        q("u5", "Never before ___ such a dramatic shift in policy.", ["there has been", "has there been", "there was"], 1, "Negative adverb fronting requires subject-auxiliary inversion.", UpperAdvanced),
        q("u6", "Lest we ___ the same mistakes, caution is advised.", ["repeat", "repeated", "repeating"], 0, "\"Lest\" triggers subjunctive mood with base form.", UpperAdvanced),
        q("u7", "The theory posits that consciousness ___ an emergent property.", ["is", "be", "being"], 1, "\"Posit that\" in formal English takes subjunctive.", UpperAdvanced),
        q("u8", "His manner of speaking, ___ antiquated, charmed the audience.", ["albeit", "although", "despite"], 0, "\"Albeit\" means \"although it is\" and takes adjectives directly.", UpperAdvanced),
        q("u9", "___ it be necessary, additional resources will be allocated.", ["Should", "Would", "If"], 0, "\"Should\" inversion replaces \"If it should\" in formal conditionals.", UpperAdvanced),
        q("u10", "The evidence, such ___ it is, remains inconclusive.", ["that", "as", "which"], 1, "\"Such as it is\" is a fixed phrase meaning \"limited though it is.\"", UpperAdvanced),
        q("u11", "On no account ___ this information to be disclosed.", ["is", "was", "being"], 0, "Negative fronting with passive: auxiliary \"is\" inverts.", UpperAdvanced),
        q("u12", "It was not until the 20th century ___ the theory was accepted.", ["when", "that", "which"], 1, "Cleft sentence \"It was...that\" for emphasis.", UpperAdvanced),
        q("u13", "The manuscript, ___ provenance is uncertain, fetched millions.", ["which", "whose", "of which the"], 2, "Formal style uses \"of which the\" for possession.", UpperAdvanced),
        q("u14", "Try ___ he might, he could not solve the equation.", ["as", "though", "if"], 0, "\"Try as he might\" is an inverted concessive structure.", UpperAdvanced),
        q("u15", "The proposal that she ___ appointed was rejected.", ["is", "be", "was"], 1, "Subjunctive in noun clause after \"proposal that.\"", UpperAdvanced),
        q("u16", "Not a word ___ he say during the entire meeting.", ["did", "does", "had"], 0, "Negative object fronting triggers inversion with \"did.\"", UpperAdvanced),
        q("u17", "The theory, ___ speculative as it may seem, has merit.", ["however", "as", "though"], 0, "\"However + adjective\" introduces concession.", UpperAdvanced),
        q("u18", "It is recommended that the policy ___ reviewed annually.", ["is", "be", "was"], 1, "Mandative subjunctive after \"recommended that.\"", UpperAdvanced),
        q("u19", "So be it; the decision, ___ unpopular, stands.", ["however", "albeit", "notwithstanding"], 1, "\"Albeit\" concedes the adjective while affirming the main point.", UpperAdvanced),
        q("u20", "___ the circumstances, alternative measures must be considered.", ["Given", "Giving", "To give"], 0, "\"Given\" as preposition means \"considering.\"", UpperAdvanced),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn standard_bank_has_twenty_per_level() {
        let bank = QuestionBank::standard();
        assert_eq!(bank.len(), 80);
        for (level, count) in bank.level_counts() {
            assert_eq!(count, 20, "level {level}");
        }
    }

    #[test]
    fn standard_bank_ids_are_unique_and_answers_in_range() {
        let bank = QuestionBank::standard();
        let ids: HashSet<&str> = bank.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), bank.len());
        assert!(bank.questions.iter().all(|q| q.correct_answer <= 2));
    }

    #[test]
    fn pool_preserves_bank_order() {
        let bank = QuestionBank::standard();
        let ids: Vec<String> = bank.pool(Level::Advanced).into_iter().map(|q| q.id).collect();
        let expected: Vec<String> = (1..=20).map(|n| format!("a{n}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn catalogue_starts_with_the_first_basic_item() {
        let bank = QuestionBank::standard();
        assert_eq!(bank.questions[0].id, "b1");
        assert_eq!(bank.questions[0].correct_option(), "went");
    }

    #[test]
    fn empty_bank_reports_zero_counts() {
        let bank = QuestionBank::default();
        assert!(bank.is_empty());
        assert_eq!(bank.level_counts().len(), 4);
        assert!(bank.level_counts().values().all(|c| *c == 0));
    }
}
