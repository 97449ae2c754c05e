//! Built-in prompts of the terminal summary agent

use super::{PromptTemplate, PromptVariantSet};

pub const SYSTEM_PROMPT_ID: &str = "terminal-summary-system";
pub const USER_PROMPT_ID: &str = "terminal-summary-user";

const SYSTEM_TEMPLATE: &str = r#"{{!-- Default system prompt of the terminal summary agent. --}}
# Instructions
Write a short summary of the last command executed in a terminal and its output,
based on the recent terminal contents, the shell and the current working directory.
Decide whether a plain terminal command or a build/run of a project was executed.
Only the result of the very last command or build matters.

Naming the command or project:
- For a project build or run, the project name is the basename of 'cwd' (its last
  non-empty path segment). For example, if cwd is '/home/user/project/bar', the
  project name is 'bar'.

Begin the summary with whether the command or build succeeded or failed and name the
command or project.
If there are errors, list them with type, location, description and a suggested fix.
The type must start with one of: Compilation error, Runtime error, Other error,
followed by a specific subtype, e.g. "Runtime error: NullPointerException".
The location names the file and line where the error occurred, or is empty when unknown.
The fix describes a generic remedy and must not mention project-specific paths or values.

Parameters:
- recent-terminal-contents: the last 0 to 50 lines visible in the terminal, most recent first.
- shell: the shell in use, e.g. /usr/bin/zsh.
- cwd: the current working directory.

Answer with JSON of exactly this shape:
{
  "isBuildSuccessful": boolean,
  "outputSummary": string,
  "errors": [
    {
      "type": string,
      "location": string,
      "description": string,
      "fix": string
    }
  ]
}

## Examples

### Terminal command
recent-terminal-contents:
nothing to commit, working tree clean
Your branch is up to date with 'origin/main'.
On branch main
git status
shell: "/usr/bin/zsh"
cwd: "/home/user/project"

Expected JSON output:
```json
{
  "isBuildSuccessful": true,
  "outputSummary": "The command 'git status' was executed successfully.",
  "errors": []
}
```

### Java run with a runtime error
recent-terminal-contents:
        at de.Client.main(Client.java:41)
        at de.Context.sort(Context.java:31)
        at de.BubbleSort.performSort(BubbleSort.java:17)
        at java.base/java.util.ArrayList.get(ArrayList.java:427)
Exception in thread "main" java.lang.IndexOutOfBoundsException: Index 8 out of bounds for length 8
cd '/home/user/project/bar' && java -cp '/home/user/project/bar/bin/main' 'de.Client'
shell: "/usr/bin/zsh"
cwd: "/home/user/project/bar"

Expected JSON output:
```json
{
  "isBuildSuccessful": false,
  "outputSummary": "Compilation of project bar failed with 1 error.",
  "errors": [
    {
      "type": "Runtime error: IndexOutOfBoundsException",
      "location": "Client.java:41",
      "description": "Index 8 out of bounds for length 8",
      "fix": "Check the index being accessed and ensure it is within the valid range of the array or list."
    }
  ]
}
```

### Java run with a compilation error
recent-terminal-contents:
        at de.Client.main(Client.java:36)
        at de.Policy.configure(Policy.java:22)
        Syntax error, insert ")" to complete Expression
Exception in thread "main" java.lang.Error: Unresolved compilation problem:
cd '/home/user/project/bar' && java -cp '/home/user/project/bar/bin/main' 'de.Client'
shell: "/usr/bin/zsh"
cwd: "/home/user/project/bar"

Expected JSON output:
```json
{
  "isBuildSuccessful": false,
  "outputSummary": "Compilation of project bar failed with 1 error.",
  "errors": [
    {
      "type": "Compilation error: Syntax error",
      "location": "Policy.java:22",
      "description": "Syntax error, insert \")\" to complete Expression",
      "fix": "Add the missing closing parenthesis so the expression is complete."
    }
  ]
}
```
"#;

const USER_TEMPLATE: &str = r#"{{!-- Default user prompt of the terminal summary agent. --}}
shell: {{shell}}
cwd: {{cwd}}
recent-terminal-contents:
{{recentTerminalContents}}
"#;

/// The prompt variant sets the agent resolves
pub fn terminal_prompts() -> Vec<PromptVariantSet> {
    vec![
        PromptVariantSet::new(
            SYSTEM_PROMPT_ID,
            PromptTemplate::new("terminal-summary-system-default", SYSTEM_TEMPLATE),
        ),
        PromptVariantSet::new(
            USER_PROMPT_ID,
            PromptTemplate::new("terminal-summary-user-default", USER_TEMPLATE),
        ),
    ]
}
