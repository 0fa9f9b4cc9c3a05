use std::fmt;

use crate::runtime::{
    arglist::Arglist,
    error::RuntimeError,
    kind::ValueKind,
    value::{Object, Payload, Value},
};

/// Rust implementation of a compiled function. It borrows its saturated
/// arguments and returns an owned result.
pub type Function = fn(&Arglist) -> Value;

/// Natively compiled function. It borrows an arglist value and returns an
/// owned value pointer (null signals failure).
pub type NativeFunction = unsafe extern "C" fn(*const Object) -> *const Object;

#[derive(Clone, Copy)]
pub enum Callee {
    Rust(Function),
    Native(NativeFunction),
}

impl fmt::Debug for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::Rust(func) => write!(f, "Rust({:p})", *func as *const ()),
            Callee::Native(func) => write!(f, "Native({:p})", *func as *const ()),
        }
    }
}

/// A function pointer paired with the arguments bound to it so far.
#[derive(Debug)]
pub struct Closure {
    callee: Callee,
    arglist: Arglist,
}

impl Closure {
    pub fn callee(&self) -> Callee {
        self.callee
    }

    pub fn arglist(&self) -> &Arglist {
        &self.arglist
    }

    pub fn is_saturated(&self) -> bool {
        self.arglist.is_saturated()
    }

    /// Calls the function with the bound arguments in application order.
    pub fn invoke(&self) -> Result<Value, RuntimeError> {
        if !self.arglist.is_saturated() {
            return Err(RuntimeError::Unsaturated {
                missing: self.arglist.missing(),
                total: self.arglist.total(),
            });
        }
        match self.callee {
            Callee::Rust(function) => Ok(function(&self.arglist)),
            Callee::Native(function) => {
                let arglist = Value::new(Payload::Arglist(self.arglist.duplicate()));
                // SAFETY: the pointer refers to a live arglist value that
                // outlives the call; native functions borrow it and return
                // either null or a reference they transfer to us.
                let result = unsafe { function(arglist.as_ptr()) };
                if result.is_null() {
                    return Err(RuntimeError::NullResult);
                }
                // SAFETY: non-null results are owned references.
                Ok(unsafe { Value::from_raw(result) })
            }
        }
    }

    fn extended(&self, arg: Value) -> Result<Closure, RuntimeError> {
        Ok(Closure {
            callee: self.callee,
            arglist: self.arglist.with_arg(arg)?,
        })
    }

    pub(crate) fn drain_into(&mut self, out: &mut Vec<Value>) {
        self.arglist.drain_into(out);
    }
}

fn expect_closure(value: &Value) -> Result<&Closure, RuntimeError> {
    value
        .as_closure()
        .ok_or(RuntimeError::kind_mismatch(ValueKind::Closure, value.kind()))
}

fn closure_from(callee: Callee, arglist: &Value) -> Result<Value, RuntimeError> {
    let source = arglist
        .as_arglist()
        .ok_or(RuntimeError::kind_mismatch(ValueKind::Arglist, arglist.kind()))?;
    Ok(Value::new(Payload::Closure(Closure {
        callee,
        arglist: source.duplicate(),
    })))
}

/// Pairs `function` with a copy of `arglist`.
///
/// The closure references every supplied argument itself, so the source
/// arglist and the closure have independent lifetimes.
pub fn make_closure_from_arglist(function: Function, arglist: &Value) -> Result<Value, RuntimeError> {
    closure_from(Callee::Rust(function), arglist)
}

/// Like [`make_closure_from_arglist`] for natively compiled functions.
pub fn make_native_closure_from_arglist(
    function: NativeFunction,
    arglist: &Value,
) -> Result<Value, RuntimeError> {
    closure_from(Callee::Native(function), arglist)
}

/// A closure of `arity` arguments with none bound yet.
pub fn new_closure(function: Function, arity: usize) -> Value {
    Value::new(Payload::Closure(Closure {
        callee: Callee::Rust(function),
        arglist: Arglist::new(arity, arity),
    }))
}

/// Invokes a saturated closure value.
pub fn invoke_closure(function: &Value) -> Result<Value, RuntimeError> {
    expect_closure(function)?.invoke()
}

/// Applies a function value to one more argument.
///
/// Returns the result of the call once the closure saturates, and a new,
/// longer closure otherwise. A closure that is already saturated is called
/// first and its result applied to `arg`.
pub fn apply_closure(function: &Value, arg: Value) -> Result<Value, RuntimeError> {
    let mut current = function.clone();
    loop {
        let closure = expect_closure(&current)?;
        if closure.is_saturated() {
            current = closure.invoke()?;
            continue;
        }
        let extended = closure.extended(arg)?;
        if extended.is_saturated() {
            return extended.invoke();
        }
        return Ok(Value::new(Payload::Closure(extended)));
    }
}

/// Applies `args` one at a time, left to right.
pub fn apply_closure_many(
    function: &Value,
    args: impl IntoIterator<Item = Value>,
) -> Result<Value, RuntimeError> {
    let mut current = function.clone();
    for arg in args {
        current = apply_closure(&current, arg)?;
    }
    Ok(current)
}
