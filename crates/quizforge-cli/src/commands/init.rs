//! The `quizforge init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizforge.toml").exists() {
        println!("quizforge.toml already exists, skipping.");
    } else {
        std::fs::write("quizforge.toml", SAMPLE_CONFIG)?;
        println!("Created quizforge.toml");
    }

    std::fs::create_dir_all("samples")?;
    let sample_path = std::path::Path::new("samples/sample-batch.json");
    if sample_path.exists() {
        println!("samples/sample-batch.json already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_BATCH)?;
        println!("Created samples/sample-batch.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizforge.toml with your default subject and grade");
    println!("  2. Run: quizforge validate --input samples/sample-batch.json");
    println!("  3. Run: quizforge convert --input samples/sample-batch.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration

id_prefix = "q"
batch_prefix = "item"
pretty = true

# Used when a batch file has no skill_info of its own.
[skill]
subject = "Math"
grade = "1"
skill_name = ""
skill_number = ""
"#;

const SAMPLE_BATCH: &str = r#"{
  "skill_info": {
    "subject": "Math",
    "grade": "1",
    "skill_name": "Counting and comparing",
    "skill_number": "A.1"
  },
  "questions": [
    {
      "question": "How many 🍎 are there?",
      "visual": "🍎🍎🍎",
      "options": ["2", "3", "4"],
      "correct_answer": 1,
      "hint": "Point at each apple as you count."
    },
    {
      "question": "True or False: 5 is greater than 3.",
      "correct_answer": "true",
      "explanation": "5 comes after 3 when counting."
    },
    {
      "question": "2 + 2 = ____",
      "correct_answer": "4"
    },
    {
      "question": "Which number is the smallest?",
      "options": ["9", "4", "7"],
      "correct_answer": "4"
    },
    {
      "question": "What is 10 - 3?",
      "correct_answer": 7
    }
  ]
}
"#;
